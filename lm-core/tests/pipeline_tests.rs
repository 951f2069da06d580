/*
 * Integration tests for Lumen
 *
 * Drive the whole sample -> map -> apply cycle with a scripted camera and a
 * shell script standing in for the brightness utility.
 */

#![cfg(unix)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::{GrayImage, Luma};
use lm_core::hw::{CameraBackend, CaptureDevice, Clock, Frame};
use lm_core::{
    load_settings, Actuator, AmbientLightSampler, BrightnessAdjuster, BrightnessConfig,
    BrightnessControl, LumenError, LunarCli, Result, SamplerSettings,
};
use serial_test::serial;
use tempfile::TempDir;

// Test utilities

struct ScriptedCamera {
    frames: Vec<Option<u8>>,
    online: bool,
}

struct ScriptedDevice {
    frames: VecDeque<Option<u8>>,
}

impl CameraBackend for ScriptedCamera {
    type Device = ScriptedDevice;

    fn open(&self, index: u32) -> Result<ScriptedDevice> {
        if !self.online {
            return Err(LumenError::device_unavailable(index, "no camera"));
        }
        Ok(ScriptedDevice {
            frames: self.frames.iter().copied().collect(),
        })
    }
}

impl CaptureDevice for ScriptedDevice {
    fn read_frame(&mut self) -> Result<Frame> {
        match self.frames.pop_front().flatten() {
            Some(level) => Ok(Frame::ImageLuma8(GrayImage::from_pixel(8, 6, Luma([level])))),
            None => Err(LumenError::FrameCapture("no frame".to_string())),
        }
    }

    fn release(&mut self) {}
}

struct SteppingClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
    }
}

fn sampler_settings() -> SamplerSettings {
    SamplerSettings {
        camera_index: 0,
        warmup: Duration::from_secs(2),
        sample_interval: Duration::from_millis(100),
        retry_delay: Duration::from_millis(100),
    }
}

/// Write an executable fake utility that appends its arguments to `calls.log`
fn fake_utility(dir: &TempDir, body: &str) -> (PathBuf, PathBuf) {
    let log = dir.path().join("calls.log");
    let script = dir.path().join("lunar");
    let contents = format!(
        "#!/bin/sh\necho \"$@\" >> '{}'\n{}\n",
        log.display(),
        body
    );
    fs::write(&script, contents).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script, log)
}

fn calls(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
#[serial]
fn test_end_to_end_cycle() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");

    let camera = ScriptedCamera {
        frames: vec![Some(0), Some(255), Some(0), Some(255)],
        online: true,
    };
    let clock = SteppingClock::new();
    let sampler = AmbientLightSampler::with_clock(camera, sampler_settings(), &clock);
    let config = BrightnessConfig::new(30, 70, 1.0);
    let adjuster = BrightnessAdjuster::new(config, sampler, LunarCli::new(&script));

    let report = adjuster.adjust_detailed().unwrap();
    assert_eq!(report.ambient.samples, 4);
    assert_eq!(report.ambient.value, 127.5);
    assert_eq!(report.applied_percent, 50);
    assert_eq!(calls(&log), vec!["set brightness 50"]);
}

#[test]
#[serial]
fn test_camera_failure_never_invokes_utility() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");

    let camera = ScriptedCamera {
        frames: Vec::new(),
        online: false,
    };
    let clock = SteppingClock::new();
    let sampler = AmbientLightSampler::with_clock(camera, sampler_settings(), &clock);
    let adjuster =
        BrightnessAdjuster::new(BrightnessConfig::default(), sampler, LunarCli::new(&script));

    assert!(!adjuster.adjust());
    assert!(calls(&log).is_empty());
}

#[test]
#[serial]
fn test_no_frames_never_invokes_utility() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");

    let camera = ScriptedCamera {
        frames: vec![None; 5],
        online: true,
    };
    let clock = SteppingClock::new();
    let sampler = AmbientLightSampler::with_clock(camera, sampler_settings(), &clock);
    let adjuster =
        BrightnessAdjuster::new(BrightnessConfig::default(), sampler, LunarCli::new(&script));

    let err = adjuster.adjust_detailed().unwrap_err();
    assert!(matches!(err, LumenError::NoData { .. }));
    assert!(calls(&log).is_empty());
}

#[test]
#[serial]
fn test_actuator_clamps_and_truncates() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");
    let actuator = Actuator::new(LunarCli::new(&script));

    assert!(actuator.apply(57.9));
    assert!(actuator.apply(150.0));
    assert!(actuator.apply(-3.0));
    assert_eq!(
        calls(&log),
        vec!["set brightness 57", "set brightness 100", "set brightness 0"]
    );
}

#[test]
#[serial]
fn test_utility_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_utility(&dir, "echo 'no display' >&2\nexit 3");
    let actuator = Actuator::new(LunarCli::new(&script));

    assert!(!actuator.apply(40.0));
    match actuator.try_apply(40.0) {
        Err(LumenError::UtilityFailed { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "no display");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
#[serial]
fn test_query_current_brightness() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "echo '42%'");
    let control = LunarCli::new(&script);

    assert_eq!(control.get_brightness().unwrap(), 42.0);
    assert_eq!(calls(&log), vec!["get brightness"]);
}

#[test]
#[serial]
fn test_query_unparseable_output() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_utility(&dir, "echo 'bright'");

    let err = LunarCli::new(&script).get_brightness().unwrap_err();
    assert!(matches!(err, LumenError::ParseFailure { .. }));
}

#[test]
#[serial]
fn test_missing_utility() {
    let actuator = Actuator::new(LunarCli::new("/nonexistent/lumen/lunar"));
    assert!(!actuator.apply(50.0));
}

#[test]
#[serial]
fn test_utility_not_executable() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
    let actuator = Actuator::new(LunarCli::new(&script));

    assert!(!actuator.apply(40.0));
    match actuator.try_apply(40.0) {
        Err(LumenError::UtilityError(reason)) => {
            assert!(reason.contains("Permission denied"), "{}", reason)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(calls(&log).is_empty());
}

#[test]
#[serial]
fn test_utility_killed_by_signal() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "kill -9 $$");
    let actuator = Actuator::new(LunarCli::new(&script));

    assert!(!actuator.apply(40.0));
    assert!(matches!(
        actuator.try_apply(40.0),
        Err(LumenError::UtilityFailed { code: None, .. })
    ));
    assert_eq!(calls(&log), vec!["set brightness 40", "set brightness 40"]);
}

#[test]
#[serial]
fn test_settings_file_drives_cycle() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_utility(&dir, "exit 0");
    let config_path = dir.path().join("config.json");
    let document = serde_json::json!({
        "min_brightness": 90,
        "max_brightness": 40,
        "capture_duration": 0.5,
        "warmup": 0,
        "utility_path": script.display().to_string(),
    });
    fs::write(&config_path, document.to_string()).unwrap();

    let settings = load_settings(&config_path);
    assert_eq!(settings.brightness, BrightnessConfig::new(40, 90, 0.5));
    assert_eq!(settings.sampler.warmup, Duration::ZERO);

    let camera = ScriptedCamera {
        frames: vec![Some(255); 10],
        online: true,
    };
    let clock = SteppingClock::new();
    let sampler = AmbientLightSampler::with_clock(camera, settings.sampler, &clock);
    let adjuster = BrightnessAdjuster::new(
        settings.brightness,
        sampler,
        LunarCli::new(settings.utility_path.clone()),
    );

    assert!(adjuster.adjust());
    assert_eq!(calls(&log), vec!["set brightness 90"]);
}
