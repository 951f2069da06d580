//! Display brightness control via an external utility
//!
//! Brightness is changed with `<utility> set brightness <0-100>` and read with
//! `<utility> get brightness`. The default utility is the Lunar CLI.
//!
//! Every invocation is classified into a [`CommandOutcome`]; the [`Actuator`]
//! turns failures into log entries and a `false` result, never a panic.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info};

use crate::constants::{brightness, utility};
use crate::error::{LumenError, Result};

/// Result of running the brightness utility once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exit status zero
    Success { stdout: String },
    /// The program could not be found
    NotFound,
    /// The program ran and reported failure
    NonZeroExit { code: Option<i32>, stderr: String },
    /// Spawning or waiting failed for another reason
    UnexpectedError(String),
}

impl CommandOutcome {
    /// Convert into the crate error type, keeping stdout on success
    pub fn into_result(self, program: &Path) -> Result<String> {
        match self {
            CommandOutcome::Success { stdout } => Ok(stdout),
            CommandOutcome::NotFound => Err(LumenError::UtilityNotFound(program.to_path_buf())),
            CommandOutcome::NonZeroExit { code, stderr } => {
                Err(LumenError::UtilityFailed { code, stderr })
            }
            CommandOutcome::UnexpectedError(reason) => Err(LumenError::UtilityError(reason)),
        }
    }
}

/// Run `program` with `args`, capturing its output
pub fn run_utility(program: &Path, args: &[&str]) -> CommandOutcome {
    debug!("Running {:?} {}", program, args.join(" "));

    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => CommandOutcome::Success {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        },
        Ok(output) => CommandOutcome::NonZeroExit {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => CommandOutcome::NotFound,
        Err(e) => CommandOutcome::UnexpectedError(e.to_string()),
    }
}

/// Parse the utility's brightness output, e.g. `"42"`, `"42.5%"`, `" 42 %\n"`
pub fn parse_brightness_output(output: &str) -> Result<f64> {
    let cleaned = output.replace('%', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LumenError::ParseFailure {
            output: output.trim().to_string(),
        })
}

/// Clamp a target brightness to 0-100 and truncate it to an integer
///
/// NaN becomes 0.
pub fn to_percent(target: f64) -> u8 {
    target.clamp(brightness::MIN_PERCENT as f64, brightness::MAX_PERCENT as f64) as u8
}

/// Low-level access to the display brightness
#[cfg_attr(test, mockall::automock)]
pub trait BrightnessControl {
    /// Set brightness to an integer percentage (0-100)
    fn set_brightness(&self, percent: u8) -> Result<()>;

    /// Read the current brightness percentage
    fn get_brightness(&self) -> Result<f64>;
}

/// Brightness control through a Lunar-compatible CLI
#[derive(Debug, Clone)]
pub struct LunarCli {
    program: PathBuf,
}

impl LunarCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for LunarCli {
    fn default() -> Self {
        Self::new(utility::DEFAULT_PROGRAM)
    }
}

impl BrightnessControl for LunarCli {
    fn set_brightness(&self, percent: u8) -> Result<()> {
        let value = percent.to_string();
        let stdout = run_utility(
            &self.program,
            &[utility::SET_COMMAND, utility::BRIGHTNESS_PROPERTY, &value],
        )
        .into_result(&self.program)?;
        debug!("{:?} output: {}", self.program, stdout.trim());
        Ok(())
    }

    fn get_brightness(&self) -> Result<f64> {
        let stdout = run_utility(
            &self.program,
            &[utility::GET_COMMAND, utility::BRIGHTNESS_PROPERTY],
        )
        .into_result(&self.program)?;
        let value = parse_brightness_output(&stdout)?;
        debug!("Current display brightness: {}%", value);
        Ok(value)
    }
}

/// Applies target brightness values through a [`BrightnessControl`]
pub struct Actuator<C: BrightnessControl> {
    control: C,
}

impl<C: BrightnessControl> Actuator<C> {
    pub fn new(control: C) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Clamp, truncate and apply; returns the percentage that was set
    pub fn try_apply(&self, target: f64) -> Result<u8> {
        let percent = to_percent(target);
        info!("Setting display brightness to {}%", percent);
        self.control.set_brightness(percent)?;
        info!("Display brightness set to {}%", percent);
        Ok(percent)
    }

    /// Apply a target brightness; failures are logged and reported as `false`
    pub fn apply(&self, target: f64) -> bool {
        match self.try_apply(target) {
            Ok(_) => true,
            Err(e) => {
                report_failure(&e);
                false
            }
        }
    }

    /// Read the current display brightness
    pub fn query(&self) -> Result<f64> {
        self.control.get_brightness()
    }
}

pub(crate) fn report_failure(err: &LumenError) {
    match err {
        LumenError::UtilityNotFound(program) => error!(
            "Brightness utility {:?} not found; check that it is installed and on PATH",
            program
        ),
        LumenError::UtilityFailed { code, stderr } => {
            error!("Brightness utility failed with exit code {:?}", code);
            if !stderr.is_empty() {
                error!("Utility stderr: {}", stderr);
            }
        }
        other => error!("Failed to set display brightness: {}", other),
    }
}
