//! Headless broom tuner.
//!
//! Flies scripted scenarios against the flat-ground reference world and prints
//! hover, speed and climb characteristics for a config, optionally writing CSV
//! telemetry for every frame.
//!
//! Run with: cargo run -p broom --bin broom-tuning -- --scenario all
//! Example: cargo run -p broom --bin broom-tuning -- --config fast.toml --set max_speed=30 --telemetry -

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use broom_core::{
    BroomBody, BroomConfig, BroomController, ControlInput, GearMode,
    telemetry::{self, TelemetrySnapshot},
    world::FlatWorld,
};
use clap::{Parser, ValueEnum};
use glam::Vec3;

/// Altitude band around the final altitude that counts as settled (m).
const SETTLE_BAND: f32 = 0.1;

/// Height the hover scenario drops the broom from, above its hover height (m).
const HOVER_DROP: f32 = 3.0;

/// Start height of the descent scenario (m).
const DESCENT_START: f32 = 20.0;

/// How close to a height bound counts as having reached it (m).
const BOUND_TOLERANCE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Drop onto the hover cushion with no input.
    Hover,
    /// Full throttle in gear 1.
    Cruise,
    /// Full throttle in gear 2.
    Climb,
    /// Full throttle in gear 3.
    Descend,
    /// Every scenario in turn.
    All,
}

impl Scenario {
    fn expand(self) -> Vec<Scenario> {
        match self {
            Self::All => vec![Self::Hover, Self::Cruise, Self::Climb, Self::Descend],
            other => vec![other],
        }
    }
}

#[derive(Parser)]
#[command(about = "Headless tuning harness for the broom controller")]
struct CliArgs {
    /// TOML config file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config overrides as `field=value`, applied after the file.
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Scenario to run.
    #[arg(long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Logic frame rate (Hz).
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f32,

    /// Fixed physics rate (Hz).
    #[arg(long, default_value_t = 60.0)]
    physics_rate: f32,

    /// Simulated time per scenario (s).
    #[arg(long, default_value_t = 10.0)]
    duration: f32,

    /// Write CSV telemetry to this file, or `-` for stdout.
    #[arg(long)]
    telemetry: Option<String>,
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected `field=value`, got `{s}`"))
}

/// Measurements from one scenario.
#[derive(Debug, Default)]
struct Measurements {
    min_altitude: f32,
    max_altitude: f32,
    final_altitude: f32,
    settling_time: Option<f32>,
    top_speed: f32,
    time_to_90_percent: Option<f32>,
    time_to_bound: Option<f32>,
    peak_vertical_speed: f32,
}

fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("# ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(args.frame_rate > 0.0 && args.physics_rate > 0.0 && args.duration > 0.0) {
        return Err("frame rate, physics rate and duration must be positive".into());
    }

    let base = match &args.config {
        Some(path) => BroomConfig::load(path)?,
        None => BroomConfig::default(),
    };
    let config = base.with_overrides(
        args.overrides
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    )?;

    let mut telemetry_out: Option<Box<dyn Write>> = match args.telemetry.as_deref() {
        None => None,
        Some("-") => Some(Box::new(BufWriter::new(io::stdout()))),
        Some(path) => Some(Box::new(BufWriter::new(File::create(path)?))),
    };
    if let Some(out) = telemetry_out.as_mut() {
        telemetry::write_header(out)?;
    }

    eprintln!(
        "# Frame rate {:.0} Hz, physics rate {:.0} Hz, {:.1} s per scenario",
        args.frame_rate, args.physics_rate, args.duration
    );

    for scenario in args.scenario.expand() {
        let results = fly(scenario, &config, args, telemetry_out.as_mut())?;
        report(scenario, &config, &results);
    }

    if let Some(out) = telemetry_out.as_mut() {
        out.flush()?;
    }
    Ok(())
}

/// Fly one scenario and measure it.
fn fly(
    scenario: Scenario,
    config: &BroomConfig,
    args: &CliArgs,
    mut telemetry_out: Option<&mut Box<dyn Write>>,
) -> io::Result<Measurements> {
    let start_height = match scenario {
        Scenario::Hover => config.hover_height + HOVER_DROP,
        Scenario::Descend => config.clamp_height(DESCENT_START),
        _ => config.hover_height,
    };
    let (gear, throttle) = match scenario {
        Scenario::Hover | Scenario::All => (GearMode::Forward, 0.0),
        Scenario::Cruise => (GearMode::Forward, 1.0),
        Scenario::Climb => (GearMode::Up, 1.0),
        Scenario::Descend => (GearMode::Down, 1.0),
    };

    let mut world = FlatWorld::new(Vec3::new(0.0, start_height, 0.0), args.physics_rate);
    let mut controller = BroomController::new(config.clone(), &world.body);
    let frame_dt = 1.0 / args.frame_rate;
    let frames = (args.duration * args.frame_rate).ceil() as u32;

    let mut altitudes = Vec::with_capacity(frames as usize);
    let mut results = Measurements {
        min_altitude: f32::MAX,
        ..Measurements::default()
    };

    for frame in 0..frames {
        let mut input = ControlInput::new().with_throttle(throttle);
        if frame == 0 && gear != GearMode::Forward {
            input = input.with_shift(gear);
        }

        world.run_frame(&mut controller, &input, frame_dt);
        for event in controller.drain_events() {
            tracing::debug!("{event}");
        }

        let t = world.time();
        let altitude = world.altitude();
        let velocity = world.body.linear_velocity();
        let horizontal_speed = Vec3::new(velocity.x, 0.0, velocity.z).length();

        altitudes.push((t, altitude));
        results.min_altitude = results.min_altitude.min(altitude);
        results.max_altitude = results.max_altitude.max(altitude);
        results.top_speed = results.top_speed.max(horizontal_speed);
        results.peak_vertical_speed = results.peak_vertical_speed.max(velocity.y.abs());

        if results.time_to_90_percent.is_none() && horizontal_speed >= config.max_speed * 0.9 {
            results.time_to_90_percent = Some(t);
        }
        let bound = match scenario {
            Scenario::Climb => Some(config.max_height),
            Scenario::Descend => Some(config.min_height),
            _ => None,
        };
        if results.time_to_bound.is_none()
            && bound.is_some_and(|b| (world.body.position().y - b).abs() <= BOUND_TOLERANCE)
        {
            results.time_to_bound = Some(t);
        }

        if let Some(out) = telemetry_out.as_mut() {
            let snapshot =
                TelemetrySnapshot::capture(&controller, &world.body, &input, t, frame_dt);
            telemetry::write_row(out, &snapshot)?;
        }
    }

    results.final_altitude = world.altitude();
    results.settling_time = settling_time(&altitudes, results.final_altitude);
    Ok(results)
}

/// Time after which the altitude stays within [`SETTLE_BAND`] of `target`.
fn settling_time(altitudes: &[(f32, f32)], target: f32) -> Option<f32> {
    let last_outside = altitudes
        .iter()
        .rposition(|(_, altitude)| (altitude - target).abs() > SETTLE_BAND);
    match last_outside {
        None => altitudes.first().map(|(t, _)| *t),
        Some(i) => altitudes.get(i + 1).map(|(t, _)| *t),
    }
}

fn report(scenario: Scenario, config: &BroomConfig, results: &Measurements) {
    let format_time = |t: Option<f32>| t.map_or_else(|| "never".to_string(), |t| format!("{t:.2} s"));

    eprintln!("# {scenario:?}:");
    eprintln!(
        "#   Altitude: {:.2} m final, band {:.2}..{:.2} m",
        results.final_altitude, results.min_altitude, results.max_altitude
    );
    match scenario {
        Scenario::Hover => {
            eprintln!(
                "#   Settled within {SETTLE_BAND} m: {}",
                format_time(results.settling_time)
            );
        }
        Scenario::Cruise => {
            eprintln!(
                "#   Top speed: {:.2} m/s of {:.2} m/s",
                results.top_speed, config.max_speed
            );
            eprintln!(
                "#   Time to 90%: {}",
                format_time(results.time_to_90_percent)
            );
        }
        Scenario::Climb | Scenario::Descend => {
            eprintln!(
                "#   Peak vertical speed: {:.2} m/s of {:.2} m/s",
                results.peak_vertical_speed, config.max_vertical_speed
            );
            eprintln!(
                "#   Time to height bound: {}",
                format_time(results.time_to_bound)
            );
        }
        Scenario::All => {}
    }
}
