//! Errors raised while loading and validating scene configuration.
//!
//! Integration itself never fails; only the data fed into a world can be
//! rejected.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The scene file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene is not valid JSON or does not match the expected layout.
    #[error("malformed scene: {0}")]
    Parse(#[from] serde_json::Error),

    /// Damping factors must lie in `[0, 1]`.
    #[error("{field} damping must be within [0, 1], got {value}")]
    InvalidDamping { field: &'static str, value: f32 },

    /// Mass must be zero (immovable), positive, or infinite.
    #[error("mass must be non-negative, got {0}")]
    InvalidMass(f32),

    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    #[error("max_substeps must be at least 1")]
    InvalidSubsteps,

    /// Shape dimensions must be positive and finite.
    #[error("invalid {shape} dimensions: {detail}")]
    InvalidShape { shape: &'static str, detail: String },

    #[error("{field} contains a non-finite component")]
    NonFinite { field: &'static str },

    /// An all-zero quaternion names no rotation.
    #[error("orientation must not be the zero quaternion")]
    ZeroOrientation,
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn damping(field: &'static str, value: f32) -> ConfigError {
        ConfigError::InvalidDamping { field, value }
    }

    pub fn shape(shape: &'static str, detail: impl Into<String>) -> ConfigError {
        ConfigError::InvalidShape {
            shape,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damping_message_names_field() {
        let msg = ConfigError::damping("linear", 1.5).to_string();
        assert!(msg.contains("linear"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn io_message_names_path() {
        let err = ConfigError::io(
            "scenes/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("scenes/missing.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn parse_errors_convert() {
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
