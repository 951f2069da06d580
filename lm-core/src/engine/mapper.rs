//! Ambient luminance to display brightness mapping
//!
//! Linear interpolation from the 0-255 luminance scale into the configured
//! `[min_brightness, max_brightness]` range, always clamped to that range.

use crate::constants::luminance;
use crate::data::BrightnessConfig;

/// Map an ambient luminance reading to a target display brightness
///
/// - Fixed range (`min == max`): returns that value for any input
/// - Otherwise: `min + (ambient / 255) * (max - min)`
///
/// The result is clamped to `[min, max]` even for readings outside 0-255,
/// and a NaN reading maps to `min`.
pub fn map_brightness(ambient: f64, config: &BrightnessConfig) -> f64 {
    let min = f64::from(config.min_brightness());
    let max = f64::from(config.max_brightness());

    if config.is_fixed() {
        return min;
    }

    if ambient.is_nan() {
        return min;
    }

    let ratio = ambient / luminance::MAX_LEVEL;
    let target = min + ratio * (max - min);

    target.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min: i64, max: i64) -> BrightnessConfig {
        BrightnessConfig::new(min, max, 1.0)
    }

    #[test]
    fn test_endpoints_and_midpoint() {
        let cfg = config(30, 70);
        assert_eq!(map_brightness(0.0, &cfg), 30.0);
        assert_eq!(map_brightness(255.0, &cfg), 70.0);
        assert!((map_brightness(127.5, &cfg) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_range() {
        let cfg = config(55, 55);
        for ambient in [-100.0, 0.0, 42.0, 255.0, 1000.0, f64::NAN, f64::INFINITY] {
            assert_eq!(map_brightness(ambient, &cfg), 55.0);
        }
    }

    #[test]
    fn test_out_of_domain_is_clamped() {
        let cfg = config(30, 70);
        assert_eq!(map_brightness(-10.0, &cfg), 30.0);
        assert_eq!(map_brightness(300.0, &cfg), 70.0);
        assert_eq!(map_brightness(f64::NEG_INFINITY, &cfg), 30.0);
        assert_eq!(map_brightness(f64::INFINITY, &cfg), 70.0);
        assert_eq!(map_brightness(f64::NAN, &cfg), 30.0);
    }

    #[test]
    fn test_within_range_and_monotonic() {
        let ranges = [(0, 100), (35, 80), (30, 70), (99, 100), (0, 1)];
        for (min, max) in ranges {
            let cfg = config(min, max);
            let mut previous = f64::NEG_INFINITY;
            for step in 0..=1020 {
                let ambient = step as f64 * 0.25;
                let mapped = map_brightness(ambient, &cfg);
                assert!(mapped >= min as f64 && mapped <= max as f64);
                assert!(mapped >= previous, "not monotonic at {}", ambient);
                previous = mapped;
            }
        }
    }

    #[test]
    fn test_default_config() {
        let cfg = BrightnessConfig::default();
        assert_eq!(map_brightness(0.0, &cfg), 35.0);
        assert_eq!(map_brightness(255.0, &cfg), 80.0);
    }
}
