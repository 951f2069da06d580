//! Unified error handling for Lumen
//!
//! This crate provides a single error type used across all Lumen components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.
//!
//! None of these errors is fatal: every variant describes a condition the caller
//! can report and recover from (usually by skipping the current adjustment cycle).

use std::io;
use std::path::PathBuf;

/// Result type alias using LumenError
pub type Result<T> = std::result::Result<T, LumenError>;

/// Unified error type for all Lumen operations
#[derive(thiserror::Error, Debug)]
pub enum LumenError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Sensor Errors
    // ============================================================================
    #[error("Camera {index} unavailable: {reason}")]
    DeviceUnavailable {
        index: u32,
        reason: String,
    },

    #[error("No usable frames captured during {duration_secs:.2}s sampling window")]
    NoData {
        duration_secs: f64,
    },

    #[error("Frame capture failed: {0}")]
    FrameCapture(String),

    // ============================================================================
    // Brightness Utility Errors
    // ============================================================================
    #[error("Brightness utility not found: {0} (is it installed and on PATH?)")]
    UtilityNotFound(PathBuf),

    #[error("Brightness utility exited with {}: {stderr}", exit_label(.code))]
    UtilityFailed {
        code: Option<i32>,
        stderr: String,
    },

    #[error("Brightness utility invocation failed: {0}")]
    UtilityError(String),

    #[error("Failed to parse brightness value from '{output}'")]
    ParseFailure {
        output: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl LumenError {
    /// Create a device-unavailable error for the given camera index
    pub fn device_unavailable(index: u32, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            index,
            reason: reason.into(),
        }
    }

    /// Whether the error came from the sensor side of the pipeline
    pub fn is_sensor_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable { .. } | Self::NoData { .. } | Self::FrameCapture(_)
        )
    }

    /// Whether the error came from the brightness utility
    pub fn is_utility_error(&self) -> bool {
        matches!(
            self,
            Self::UtilityNotFound(_)
                | Self::UtilityFailed { .. }
                | Self::UtilityError(_)
                | Self::ParseFailure { .. }
        )
    }
}
