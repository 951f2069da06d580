//! Configuration types and validation
//!
//! `BrightnessConfig` is the validated triple that drives one adjustment cycle.
//! `Settings` wraps it together with the sensor, utility and scheduling options
//! read from the same settings document.
//!
//! Validation is permissive: out-of-range values are clamped and an inverted
//! min/max pair is swapped, with a warning, instead of being rejected.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::constants::{brightness, camera, timing, utility};

/// Validated brightness range and sampling window
///
/// Fields are private so a constructed value always satisfies
/// `min_brightness <= max_brightness <= 100` and `capture_duration >= 0.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessConfig {
    min_brightness: u8,
    max_brightness: u8,
    capture_duration: f64,
}

impl BrightnessConfig {
    /// Build a config from raw values, clamping and swapping as needed
    ///
    /// Brightness values are clamped to 0-100 first, then swapped if the
    /// minimum ends up above the maximum. The capture duration is raised to
    /// the 0.1 s floor; it has no upper bound.
    pub fn new(min_brightness: i64, max_brightness: i64, capture_duration: f64) -> Self {
        let mut min = clamp_percent("min_brightness", min_brightness);
        let mut max = clamp_percent("max_brightness", max_brightness);

        if min > max {
            warn!(
                "min_brightness ({}) is greater than max_brightness ({}), swapping them",
                min, max
            );
            std::mem::swap(&mut min, &mut max);
        }

        // NaN fails the comparison and lands on the floor as well
        let capture_duration = if capture_duration >= timing::MIN_CAPTURE_DURATION_SECS {
            capture_duration
        } else {
            warn!(
                "capture_duration {} is below the minimum, using {}s",
                capture_duration,
                timing::MIN_CAPTURE_DURATION_SECS
            );
            timing::MIN_CAPTURE_DURATION_SECS
        };

        Self {
            min_brightness: min,
            max_brightness: max,
            capture_duration,
        }
    }

    /// Re-run validation; a valid config comes back unchanged
    pub fn validate(self) -> Self {
        Self::new(
            i64::from(self.min_brightness),
            i64::from(self.max_brightness),
            self.capture_duration,
        )
    }

    pub fn min_brightness(&self) -> u8 {
        self.min_brightness
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    /// Sampling window length in seconds
    pub fn capture_duration(&self) -> f64 {
        self.capture_duration
    }

    /// Sampling window as a `Duration` (saturates for huge or infinite values)
    pub fn capture_window(&self) -> Duration {
        secs_to_duration(self.capture_duration)
    }

    /// Whether the output range collapses to a single value
    pub fn is_fixed(&self) -> bool {
        self.min_brightness == self.max_brightness
    }
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            min_brightness: brightness::DEFAULT_MIN,
            max_brightness: brightness::DEFAULT_MAX,
            capture_duration: timing::DEFAULT_CAPTURE_DURATION_SECS,
        }
    }
}

fn clamp_percent(field: &str, value: i64) -> u8 {
    let clamped = value.clamp(brightness::MIN_PERCENT, brightness::MAX_PERCENT);
    if clamped != value {
        warn!("{} {} is outside 0-100, clamped to {}", field, value, clamped);
    }
    clamped as u8
}

/// Convert seconds to a `Duration`, treating NaN/negative as zero and
/// saturating on overflow
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Camera and timing options for the ambient light sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    /// Capture device index
    pub camera_index: u32,
    /// Wait after opening the device before the first frame
    pub warmup: Duration,
    /// Wait after each successful frame
    pub sample_interval: Duration,
    /// Wait after each failed frame
    pub retry_delay: Duration,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            camera_index: camera::DEFAULT_INDEX,
            warmup: timing::DEFAULT_WARMUP,
            sample_interval: timing::DEFAULT_SAMPLE_INTERVAL,
            retry_delay: timing::FRAME_RETRY_DELAY,
        }
    }
}

/// Everything read from the settings document
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub brightness: BrightnessConfig,
    pub sampler: SamplerSettings,
    /// Brightness utility program (name on PATH or absolute path)
    pub utility_path: PathBuf,
    /// Watch-mode period in seconds
    pub adjust_interval: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brightness: BrightnessConfig::default(),
            sampler: SamplerSettings::default(),
            utility_path: PathBuf::from(utility::DEFAULT_PROGRAM),
            adjust_interval: timing::DEFAULT_ADJUST_INTERVAL_SECS,
        }
    }
}

impl Settings {
    /// Build settings from a parsed JSON document
    ///
    /// Every key is optional. A key whose value cannot be converted is
    /// reported and replaced by its default; the other keys still apply.
    /// A document that is not a JSON object yields all defaults.
    pub fn from_json(doc: &Value) -> Self {
        let defaults = Settings::default();
        let Some(map) = doc.as_object() else {
            warn!("Settings document is not a JSON object, using defaults");
            return defaults;
        };

        let min = int_field(map, "min_brightness").unwrap_or(i64::from(brightness::DEFAULT_MIN));
        let max = int_field(map, "max_brightness").unwrap_or(i64::from(brightness::DEFAULT_MAX));
        let duration =
            float_field(map, "capture_duration").unwrap_or(timing::DEFAULT_CAPTURE_DURATION_SECS);

        let camera_index = match int_field(map, "camera_index") {
            Some(index) => u32::try_from(index).unwrap_or_else(|_| {
                warn!(
                    "camera_index {} is not a valid device index, using {}",
                    index,
                    camera::DEFAULT_INDEX
                );
                camera::DEFAULT_INDEX
            }),
            None => camera::DEFAULT_INDEX,
        };

        let warmup = float_field(map, "warmup")
            .map(secs_to_duration)
            .unwrap_or(defaults.sampler.warmup);
        let sample_interval = float_field(map, "sample_interval")
            .map(secs_to_duration)
            .unwrap_or(defaults.sampler.sample_interval);

        let utility_path = string_field(map, "utility_path")
            .map(PathBuf::from)
            .unwrap_or(defaults.utility_path);

        let adjust_interval = match float_field(map, "adjust_interval") {
            Some(secs) if secs >= timing::MIN_ADJUST_INTERVAL_SECS => secs,
            Some(secs) => {
                warn!(
                    "adjust_interval {} is below the minimum, using {}s",
                    secs,
                    timing::MIN_ADJUST_INTERVAL_SECS
                );
                timing::MIN_ADJUST_INTERVAL_SECS
            }
            None => defaults.adjust_interval,
        };

        Self {
            brightness: BrightnessConfig::new(min, max, duration),
            sampler: SamplerSettings {
                camera_index,
                warmup,
                sample_interval,
                retry_delay: defaults.sampler.retry_delay,
            },
            utility_path,
            adjust_interval,
        }
    }

    /// Flat, serializable view of these settings
    pub fn to_document(&self) -> SettingsDocument {
        SettingsDocument {
            min_brightness: i64::from(self.brightness.min_brightness()),
            max_brightness: i64::from(self.brightness.max_brightness()),
            capture_duration: self.brightness.capture_duration(),
            camera_index: self.sampler.camera_index,
            warmup: self.sampler.warmup.as_secs_f64(),
            sample_interval: self.sampler.sample_interval.as_secs_f64(),
            utility_path: self.utility_path.to_string_lossy().into_owned(),
            adjust_interval: self.adjust_interval,
        }
    }

    /// Watch-mode period as a `Duration`
    pub fn adjust_period(&self) -> Duration {
        secs_to_duration(self.adjust_interval)
    }
}

/// On-disk shape of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    pub min_brightness: i64,
    pub max_brightness: i64,
    pub capture_duration: f64,
    pub camera_index: u32,
    pub warmup: f64,
    pub sample_interval: f64,
    pub utility_path: String,
    pub adjust_interval: f64,
}

/// Read an integer key; floats are truncated, numeric strings are parsed
fn int_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };

    if parsed.is_none() {
        warn!("Ignoring {}: {} is not an integer, using the default", key, value);
    } else {
        debug!("{} = {:?}", key, parsed);
    }
    parsed
}

/// Read a float key; numeric strings are parsed
fn float_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = map.get(key)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    if parsed.is_none() {
        warn!("Ignoring {}: {} is not a number, using the default", key, value);
    }
    parsed
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key)?;
    match value.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => {
            warn!("Ignoring {}: {} is not a non-empty string, using the default", key, value);
            None
        }
    }
}
