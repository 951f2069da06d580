//! Brightness mapping and the adjustment cycle

pub mod adjuster;
pub mod mapper;

pub use adjuster::{adjust_brightness, BrightnessAdjuster, SystemAdjuster};
pub use mapper::map_brightness;
