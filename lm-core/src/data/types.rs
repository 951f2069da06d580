//! Core data types for Lumen
//!
//! Values passed between the pipeline stages of one adjustment cycle.

use serde::Serialize;

/// Aggregated ambient luminance for one sampling window
///
/// `value` is the arithmetic mean of the per-frame mean luminance readings,
/// nominally 0-255. It is not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientEstimate {
    pub value: f64,
    /// Number of frames that contributed
    pub samples: usize,
}

/// Outcome of one successful adjustment cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleReport {
    pub ambient: AmbientEstimate,
    /// Mapped brightness, within the configured range
    pub target: f64,
    /// Integer percentage handed to the brightness utility
    pub applied_percent: u8,
}
