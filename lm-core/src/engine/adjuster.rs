//! One ambient-light adjustment cycle
//!
//! sample -> map -> apply. A sampling failure ends the cycle before the
//! display is touched; the actuator runs at most once per cycle.

use std::path::Path;

use tracing::{error, info};

use crate::data::{load_settings, resolve_config_path, BrightnessConfig, CycleReport, Settings};
use crate::engine::mapper::map_brightness;
use crate::error::Result;
use crate::hw::lunar::report_failure;
use crate::hw::{
    default_backend, Actuator, AmbientLightSampler, AmbientSampler, BrightnessControl,
    DefaultBackend, LunarCli,
};

/// Adjuster wired to the real camera and the configured utility
pub type SystemAdjuster = BrightnessAdjuster<AmbientLightSampler<DefaultBackend>, LunarCli>;

/// Orchestrates sampler, mapper and actuator
pub struct BrightnessAdjuster<S: AmbientSampler, C: BrightnessControl> {
    config: BrightnessConfig,
    sampler: S,
    actuator: Actuator<C>,
}

impl<S: AmbientSampler, C: BrightnessControl> BrightnessAdjuster<S, C> {
    pub fn new(config: BrightnessConfig, sampler: S, control: C) -> Self {
        Self {
            config,
            sampler,
            actuator: Actuator::new(control),
        }
    }

    pub fn config(&self) -> &BrightnessConfig {
        &self.config
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn actuator(&self) -> &Actuator<C> {
        &self.actuator
    }

    /// Run one cycle and report what happened, or the error that stopped it
    pub fn adjust_detailed(&self) -> Result<CycleReport> {
        let ambient = self.sampler.measure(self.config.capture_window())?;

        let target = map_brightness(ambient.value, &self.config);
        info!("Ambient light {:.2} -> brightness {:.2}%", ambient.value, target);

        let applied_percent = self.actuator.try_apply(target)?;

        Ok(CycleReport {
            ambient,
            target,
            applied_percent,
        })
    }

    /// Run one cycle; `true` only if the new brightness was applied
    pub fn adjust(&self) -> bool {
        match self.adjust_detailed() {
            Ok(_) => true,
            Err(e) if e.is_sensor_error() => {
                error!("Failed to measure ambient light: {}", e);
                false
            }
            Err(e) => {
                report_failure(&e);
                false
            }
        }
    }
}

impl SystemAdjuster {
    /// Build from already loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        let sampler = AmbientLightSampler::new(default_backend(), settings.sampler);
        let control = LunarCli::new(settings.utility_path.clone());
        Self::new(settings.brightness, sampler, control)
    }

    /// Load settings fresh from `config_path` (or the default location) and build
    pub fn load(config_path: Option<&Path>) -> Self {
        let path = resolve_config_path(config_path);
        Self::from_settings(&load_settings(&path))
    }
}

/// Run one cycle against the real hardware
///
/// Settings are loaded from the default location when none are supplied.
pub fn adjust_brightness(settings: Option<&Settings>) -> bool {
    let adjuster = match settings {
        Some(settings) => SystemAdjuster::from_settings(settings),
        None => SystemAdjuster::load(None),
    };
    adjuster.adjust()
}
