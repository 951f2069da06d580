//! Ambient light sampling
//!
//! Opens the camera, lets it warm up, then reads frames for a fixed window and
//! averages their mean luminance into one [`AmbientEstimate`].
//!
//! # Failure handling
//!
//! - Camera cannot be opened: `DeviceUnavailable`, nothing to release
//! - A single frame read fails: logged and skipped after a short delay
//! - No frame succeeded in the whole window: `NoData`
//!
//! The camera is released when the session guard drops, on every path.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::data::{AmbientEstimate, SamplerSettings};
use crate::error::{LumenError, Result};
use crate::hw::camera::{frame_luminance, CameraBackend, SensorSession};

/// Time source for the sampling loop
pub trait Clock {
    fn now(&self) -> Instant;

    /// Blocking wait
    fn sleep(&self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock with `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Produces one ambient brightness estimate per call
#[cfg_attr(test, mockall::automock)]
pub trait AmbientSampler {
    /// Sample for `duration` and return the averaged luminance
    fn measure(&self, duration: Duration) -> Result<AmbientEstimate>;
}

/// Camera-backed ambient light sampler
pub struct AmbientLightSampler<B: CameraBackend, C: Clock = SystemClock> {
    backend: B,
    settings: SamplerSettings,
    clock: C,
}

impl<B: CameraBackend> AmbientLightSampler<B, SystemClock> {
    pub fn new(backend: B, settings: SamplerSettings) -> Self {
        Self::with_clock(backend, settings, SystemClock)
    }
}

impl<B: CameraBackend, C: Clock> AmbientLightSampler<B, C> {
    /// Use a custom time source (tests, simulations)
    pub fn with_clock(backend: B, settings: SamplerSettings, clock: C) -> Self {
        Self {
            backend,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }
}

impl<B: CameraBackend, C: Clock> AmbientSampler for AmbientLightSampler<B, C> {
    fn measure(&self, duration: Duration) -> Result<AmbientEstimate> {
        let mut session = SensorSession::acquire(&self.backend, self.settings.camera_index)?;

        debug!(
            "Camera {} warming up for {:?}",
            session.index(),
            self.settings.warmup
        );
        self.clock.sleep(self.settings.warmup);

        debug!("Measuring ambient light for {:?}", duration);
        let start = self.clock.now();
        let mut sum = 0.0_f64;
        let mut samples = 0_usize;
        let mut failures = 0_usize;

        while self.clock.now().duration_since(start) < duration {
            match session.read_frame().and_then(|frame| frame_luminance(&frame)) {
                Ok(level) => {
                    sum += level;
                    samples += 1;
                    debug!("Frame luminance: {:.2}", level);
                    self.clock.sleep(self.settings.sample_interval);
                }
                Err(e) => {
                    failures += 1;
                    warn!("Skipping frame: {}", e);
                    self.clock.sleep(self.settings.retry_delay);
                }
            }
        }

        drop(session);

        if samples == 0 {
            warn!(failures, "No usable frames captured");
            return Err(LumenError::NoData {
                duration_secs: duration.as_secs_f64(),
            });
        }

        let value = sum / samples as f64;
        info!(
            samples,
            failures,
            "Ambient luminance {:.2} (from {} frames)",
            value,
            samples
        );

        Ok(AmbientEstimate { value, samples })
    }
}
