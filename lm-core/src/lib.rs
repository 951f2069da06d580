//! Lumen Core Library
//!
//! Adjusts display brightness to the ambient light seen by a webcam.
//!
//! # Features
//!
//! - **Sampling**: Averages the mean luminance of webcam frames over a short window
//! - **Mapping**: Linear transform of 0-255 luminance into a configured brightness range
//! - **Actuation**: Applies the result through a Lunar-compatible CLI
//! - **Configuration**: Optional JSON settings file with permissive validation
//!
//! # Module Structure
//!
//! - `hw/` - Camera sensor, sampling loop, brightness utility
//! - `data/` - Configuration, persistence, pipeline values
//! - `engine/` - Mapper and the adjustment cycle
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.
//!
//! # Example
//!
//! ```no_run
//! use lm_core::{load_settings, resolve_config_path, SystemAdjuster};
//!
//! let settings = load_settings(&resolve_config_path(None));
//! let ok = SystemAdjuster::from_settings(&settings).adjust();
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod constants;
pub use lm_error as error;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export primary types from data/
pub use data::{
    secs_to_duration, AmbientEstimate, BrightnessConfig, CycleReport, SamplerSettings, Settings,
    SettingsDocument,
};

// Re-export persistence functions from data/
pub use data::{load_settings, resolve_config_path, save_settings};

// Re-export error types
pub use error::{LumenError, Result};

// Re-export engine types
pub use engine::{adjust_brightness, map_brightness, BrightnessAdjuster, SystemAdjuster};

// Re-export hardware types from hw/
pub use hw::{
    default_backend, frame_luminance, Actuator, AmbientLightSampler, AmbientSampler,
    BrightnessControl, CameraBackend, CaptureDevice, Clock, CommandOutcome, DefaultBackend,
    Frame, LunarCli, SensorSession, SystemClock, UnavailableBackend,
};
