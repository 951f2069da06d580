//! Webcam capture backend (nokhwa)
//!
//! Only compiled with the `webcam` feature. Frames are decoded to RGB and
//! handed over as [`Frame`] values.

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{debug, warn};

use crate::error::{LumenError, Result};
use crate::hw::camera::{CameraBackend, CaptureDevice, Frame};

/// Opens system webcams by index
#[derive(Debug, Default, Clone, Copy)]
pub struct WebcamBackend;

/// An opened, streaming webcam
pub struct WebcamDevice {
    camera: Camera,
}

impl CameraBackend for WebcamBackend {
    type Device = WebcamDevice;

    fn open(&self, index: u32) -> Result<WebcamDevice> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| LumenError::device_unavailable(index, e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| LumenError::device_unavailable(index, e.to_string()))?;

        let format = camera.camera_format();
        debug!(
            "Webcam {} streaming {}x{}",
            index,
            format.resolution().width(),
            format.resolution().height()
        );
        Ok(WebcamDevice { camera })
    }
}

impl CaptureDevice for WebcamDevice {
    fn read_frame(&mut self) -> Result<Frame> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| LumenError::FrameCapture(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| LumenError::FrameCapture(e.to_string()))?;

        // nokhwa links its own `image` version; move the raw pixels across
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .map(Frame::ImageRgb8)
            .ok_or_else(|| {
                LumenError::FrameCapture(format!("frame buffer does not match {width}x{height}"))
            })
    }

    fn release(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            warn!("Failed to stop webcam stream: {}", e);
        }
    }
}
