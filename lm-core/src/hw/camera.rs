//! Camera capability and scoped sensor session
//!
//! The camera is only used as a luminance probe: each frame is reduced to its
//! mean grayscale value. Backends implement [`CameraBackend`] to open a device
//! and [`CaptureDevice`] to read frames from it.
//!
//! A [`SensorSession`] owns one opened device and releases it exactly once when
//! dropped, whichever way sampling ends.

use image::DynamicImage;
use tracing::{debug, trace};

use crate::error::{LumenError, Result};

/// A captured frame; any color layout, reduced to luma for measuring
pub type Frame = DynamicImage;

/// An opened capture device
pub trait CaptureDevice {
    /// Grab the next frame
    fn read_frame(&mut self) -> Result<Frame>;

    /// Give the device back to the system
    ///
    /// Called exactly once by [`SensorSession`].
    fn release(&mut self);
}

/// Something that can open capture devices by index
pub trait CameraBackend {
    type Device: CaptureDevice;

    /// Open the device at `index`; failure maps to `DeviceUnavailable`
    fn open(&self, index: u32) -> Result<Self::Device>;
}

/// Scoped ownership of one opened capture device
pub struct SensorSession<D: CaptureDevice> {
    device: D,
    index: u32,
}

impl<D: CaptureDevice> SensorSession<D> {
    /// Open device `index` on `backend`
    pub fn acquire<B>(backend: &B, index: u32) -> Result<Self>
    where
        B: CameraBackend<Device = D>,
    {
        let device = backend.open(index)?;
        debug!("Opened camera {}", index);
        Ok(Self { device, index })
    }

    pub fn read_frame(&mut self) -> Result<Frame> {
        self.device.read_frame()
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<D: CaptureDevice> Drop for SensorSession<D> {
    fn drop(&mut self) {
        self.device.release();
        debug!("Released camera {}", self.index);
    }
}

/// Mean luma (0-255) of a frame
///
/// An empty frame carries no light information and is reported as a capture
/// failure so the sampler skips it.
pub fn frame_luminance(frame: &Frame) -> Result<f64> {
    let gray = frame.to_luma8();
    let pixel_count = u64::from(gray.width()) * u64::from(gray.height());
    if pixel_count == 0 {
        return Err(LumenError::FrameCapture("empty frame".to_string()));
    }

    let sum: u64 = gray.as_raw().iter().map(|&v| u64::from(v)).sum();
    let mean = sum as f64 / pixel_count as f64;
    trace!(width = gray.width(), height = gray.height(), mean, "Frame luminance");
    Ok(mean)
}

/// Device type of [`UnavailableBackend`]; it can never be constructed
pub enum NoDevice {}

impl CaptureDevice for NoDevice {
    fn read_frame(&mut self) -> Result<Frame> {
        match *self {}
    }

    fn release(&mut self) {
        match *self {}
    }
}

/// Backend used when Lumen is built without camera support
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl CameraBackend for UnavailableBackend {
    type Device = NoDevice;

    fn open(&self, index: u32) -> Result<NoDevice> {
        Err(LumenError::device_unavailable(
            index,
            "built without webcam support (enable the `webcam` feature)",
        ))
    }
}
