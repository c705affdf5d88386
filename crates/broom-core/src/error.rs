//! Error types for the broom controller.
//!
//! The control loop itself never fails; only loading and validating a
//! configuration can.

use std::{fmt, io, path::PathBuf};

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating a [`crate::BroomConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The config file is not valid TOML or has mistyped fields.
    Parse {
        /// The parser's message.
        message: String,
    },
    /// The config could not be rendered as TOML.
    Serialize {
        /// The serializer's message.
        message: String,
    },
    /// A field holds a value the controller cannot work with.
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            Self::Parse { message } => write!(f, "failed to parse config: {message}"),
            Self::Serialize { message } => write!(f, "failed to serialize config: {message}"),
            Self::InvalidValue { field, detail } => {
                write!(f, "invalid config value for {field}: {detail}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse {
            message: e.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_value() {
        let err = ConfigError::invalid("hover_height", "must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "invalid config value for hover_height: must be positive, got 0"
        );
    }

    #[test]
    fn test_display_serialize() {
        let err = ConfigError::Serialize {
            message: "unsupported value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to serialize config: unsupported value"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_io_error_has_source() {
        let err = ConfigError::Io {
            path: PathBuf::from("missing.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing.toml"));
    }
}
