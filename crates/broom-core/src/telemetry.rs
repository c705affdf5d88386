//! Broom telemetry as CSV.
//!
//! One row per physics step, for plotting controller behaviour while tuning.

use std::io::{self, Write};

use glam::{EulerRot, Vec3};

use crate::{body::BroomBody, controller::BroomController, input::ControlInput};

/// Snapshot of controller and body state for one telemetry row.
#[derive(Clone, Debug)]
pub struct TelemetrySnapshot {
    pub elapsed: f32,
    pub dt: f32,
    pub input: ControlInput,
    pub gear: u8,
    pub grounded: bool,
    pub moving: bool,
    pub locked: bool,
    pub speed: f32,
    pub heading: f32,
    pub target_height: f32,
    pub stable_height: f32,
    pub levitation_offset: f32,
    pub tilt: glam::Quat,
    pub position: Vec3,
    pub velocity: Vec3,
    pub hover: f32,
    pub stabilization: f32,
    pub levitation: f32,
}

impl TelemetrySnapshot {
    /// Capture the controller and body after a physics step.
    pub fn capture(
        controller: &BroomController,
        body: &impl BroomBody,
        input: &ControlInput,
        elapsed: f32,
        dt: f32,
    ) -> Self {
        let commands = controller.state().last_physics;
        Self {
            elapsed,
            dt,
            input: *input,
            gear: controller.gear().index(),
            grounded: controller.is_grounded(),
            moving: controller.is_moving(),
            locked: controller.is_height_locked(),
            speed: controller.speed(),
            heading: controller.heading(),
            target_height: controller.target_height(),
            stable_height: controller.stable_height(),
            levitation_offset: controller.levitation_offset(),
            tilt: controller.tilt(),
            position: body.position(),
            velocity: body.linear_velocity(),
            hover: commands.hover,
            stabilization: commands.stabilization,
            levitation: commands.levitation,
        }
    }
}

/// Defines the CSV schema once and generates the header and row writers from it,
/// keeping column names and formats in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// Write the CSV header line.
        pub fn write_header(out: &mut impl Write) -> io::Result<()> {
            const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );
            writeln!(out, "{}", CSV_HEADER.trim_end_matches(','))
        }

        /// Write one CSV row.
        pub fn write_row(out: &mut impl Write, $snapshot: &TelemetrySnapshot) -> io::Result<()> {
            $( $prelude )*

            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            writeln!(out, "{}", line.trim_end_matches(','))
        }
    };
}

define_telemetry! {
    columns: {
        t: "{:.4}",
        dt: "{:.5}",
        steering: "{:.3}",
        throttle: "{:.3}",
        brake: "{:.3}",
        lift: "{}",
        gear: "{}",
        grounded: "{}",
        moving: "{}",
        locked: "{}",
        speed: "{:.2}",
        heading_deg: "{:.2}",
        pos_x: "{:.3}",
        pos_y: "{:.3}",
        pos_z: "{:.3}",
        vel_x: "{:.2}",
        vel_y: "{:.2}",
        vel_z: "{:.2}",
        target_h: "{:.3}",
        stable_h: "{:.3}",
        lev_offset: "{:.4}",
        hover_acc: "{:.3}",
        stab_acc: "{:.3}",
        lev_acc: "{:.4}",
        tilt_pitch_deg: "{:.2}",
        tilt_roll_deg: "{:.2}",
    },
    prelude: |s| {
        let (pitch, _, roll) = s.tilt.to_euler(EulerRot::XYZ);
    },
    row_values: {
        s.elapsed,
        s.dt,
        s.input.steering,
        s.input.throttle,
        s.input.brake,
        u8::from(s.input.emergency_lift_held),
        s.gear,
        u8::from(s.grounded),
        u8::from(s.moving),
        u8::from(s.locked),
        s.speed,
        s.heading.to_degrees(),
        s.position.x,
        s.position.y,
        s.position.z,
        s.velocity.x,
        s.velocity.y,
        s.velocity.z,
        s.target_height,
        s.stable_height,
        s.levitation_offset,
        s.hover,
        s.stabilization,
        s.levitation,
        pitch.to_degrees(),
        roll.to_degrees(),
    }
}
