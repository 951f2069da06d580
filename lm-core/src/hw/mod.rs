//! Hardware access: camera sensor and display brightness utility

pub mod camera;
pub mod lunar;
pub mod sampler;
#[cfg(feature = "webcam")]
pub mod webcam;

pub use camera::{
    frame_luminance, CameraBackend, CaptureDevice, Frame, NoDevice, SensorSession,
    UnavailableBackend,
};
pub use lunar::{
    parse_brightness_output, run_utility, to_percent, Actuator, BrightnessControl,
    CommandOutcome, LunarCli,
};
pub use sampler::{AmbientLightSampler, AmbientSampler, Clock, SystemClock};

#[cfg(test)]
pub use lunar::MockBrightnessControl;
#[cfg(test)]
pub use sampler::MockAmbientSampler;

/// Whether this build can capture from a real camera
pub const CAMERA_SUPPORT: bool = cfg!(feature = "webcam");

/// Camera backend used by the binary
#[cfg(feature = "webcam")]
pub type DefaultBackend = webcam::WebcamBackend;

/// Camera backend used by the binary
#[cfg(not(feature = "webcam"))]
pub type DefaultBackend = UnavailableBackend;

pub fn default_backend() -> DefaultBackend {
    DefaultBackend::default()
}
