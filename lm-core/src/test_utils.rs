//! Test utilities for Lumen
//!
//! Scripted camera backend and a manually advanced clock, shared by the unit
//! tests of the sensor and orchestration modules.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::{GrayImage, Luma};

use crate::error::{LumenError, Result};
use crate::hw::{CameraBackend, CaptureDevice, Clock, Frame};

/// Uniform 4x4 grayscale frame
pub fn gray_frame(level: u8) -> Frame {
    Frame::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([level])))
}

/// Camera backend that replays a script of frame reads
///
/// `Some(level)` yields a uniform frame, `None` a read failure. Once the
/// script is exhausted every read fails.
#[derive(Clone)]
pub struct FakeCamera {
    script: Arc<Mutex<VecDeque<Option<u8>>>>,
    available: bool,
    opens: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new(script: Vec<Option<u8>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            available: true,
            opens: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend whose `open` always fails
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

pub struct FakeDevice {
    camera: FakeCamera,
}

impl CaptureDevice for FakeDevice {
    fn read_frame(&mut self) -> Result<Frame> {
        self.camera.reads.fetch_add(1, Ordering::SeqCst);
        let next = self
            .camera
            .script
            .lock()
            .map_err(|_| LumenError::FrameCapture("script poisoned".to_string()))?
            .pop_front();
        match next {
            Some(Some(level)) => Ok(gray_frame(level)),
            Some(None) => Err(LumenError::FrameCapture("scripted failure".to_string())),
            None => Err(LumenError::FrameCapture("script exhausted".to_string())),
        }
    }

    fn release(&mut self) {
        self.camera.releases.fetch_add(1, Ordering::SeqCst);
    }
}

impl CameraBackend for FakeCamera {
    type Device = FakeDevice;

    fn open(&self, index: u32) -> Result<FakeDevice> {
        if !self.available {
            return Err(LumenError::device_unavailable(index, "fake camera offline"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(FakeDevice {
            camera: self.clone(),
        })
    }
}

/// Clock that only moves when something sleeps on it
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.offset.set(self.offset.get() + duration);
    }
}
