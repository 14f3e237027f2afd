//! Error handling for outline2pcb
//!
//! This module provides unified error handling using anyhow for propagation
//! and a small set of domain errors for conditions callers may want to match on.

use anyhow::Context;
use std::path::Path;

pub type Result<T> = anyhow::Result<T>;

/// Extension trait for Results to add context with file paths
pub trait ResultExt<T> {
    /// Add context with file path information
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T>;

    /// Add context naming the output format being produced
    fn with_format_context(self, format: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Send + Sync + 'static,
{
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T> {
        self.map_err(|e| -> anyhow::Error { e.into() })
            .with_context(|| format!("Failed to {} file: {}", operation, path.as_ref().display()))
    }

    fn with_format_context(self, format: &str) -> Result<T> {
        self.map_err(|e| -> anyhow::Error { e.into() })
            .with_context(|| format!("Error generating {} output", format))
    }
}

/// Specific error types for board generation
#[derive(Debug, thiserror::Error)]
pub enum PcbError {
    #[error("{format} encoder cannot render shape: {reason}")]
    UnsupportedShape { format: &'static str, reason: String },

    #[error("Malformed net: {reason}")]
    MalformedNet { reason: String },

    #[error("Via hole radius {hole_radius} must be positive and smaller than via radius {radius}")]
    InvalidVia { radius: f64, hole_radius: f64 },

    #[error("Invalid outline: {reason}")]
    InvalidOutline { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_context_message() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = result
            .with_path_context("write", "out/board-F_Cu.gbr")
            .unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to write file: out/board-F_Cu.gbr"));
    }

    #[test]
    fn test_pcb_error_is_downcastable() {
        let err: anyhow::Error = PcbError::MalformedNet {
            reason: "net has no steps".to_string(),
        }
        .into();

        let err = Err::<(), _>(err).with_format_context("Gerber").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PcbError>(),
            Some(PcbError::MalformedNet { .. })
        ));
        assert!(format!("{:#}", err).contains("Error generating Gerber output"));
    }
}
