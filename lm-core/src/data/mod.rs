//! Data types, configuration, and persistence modules
//!
//! Contains the settings model and the values exchanged by the pipeline.

mod config;
mod persistence;
mod types;

pub use config::{secs_to_duration, BrightnessConfig, SamplerSettings, Settings, SettingsDocument};
pub use persistence::{load_settings, resolve_config_path, save_settings};
pub use types::{AmbientEstimate, CycleReport};
