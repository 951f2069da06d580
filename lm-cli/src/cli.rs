//! Command Line Interface
//!
//! Argument definitions and the implementation of every sub-command.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use lm_core::constants::timing;
use lm_core::hw::{
    default_backend, Actuator, AmbientLightSampler, AmbientSampler, LunarCli, CAMERA_SUPPORT,
};
use lm_core::{
    load_settings, resolve_config_path, save_settings, secs_to_duration, BrightnessConfig,
    Settings, SystemAdjuster,
};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version)]
#[command(about = "Lumen - Display brightness that follows the ambient light")]
#[command(long_about = "Lumen - Display brightness that follows the ambient light

Measures the room brightness with the webcam and sets the display brightness
through the Lunar CLI (or any utility accepting `set brightness <0-100>`).

EXAMPLES:
    lumen                      Run one adjustment cycle (default)
    lumen watch --interval 60  Adjust every minute until interrupted
    lumen measure              Print the ambient light estimate only
    lumen get                  Print the current display brightness
    lumen set 60               Set the display brightness to 60%
    lumen config show          Show the effective settings as JSON
    lumen config init          Write a default settings file

Camera access needs a build with the `webcam` feature:
    cargo build --release -p lm-cli --features webcam
Without it, `adjust`, `watch` and `measure` exit with an error; `get`, `set`
and `config` still work.

ENVIRONMENT VARIABLES:
    LUMEN_LOG=debug        Log filter (tracing EnvFilter syntax)
    LUMEN_LOG_FILE=PATH    Log file location
    LUMEN_CONFIG=PATH      Settings file location

FILES:
    ~/.config/lumen/config.json          Settings
    ~/.local/share/lumen/logs/lumen.log  Log, rotated at 1 MiB, 3 backups kept")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run one adjustment cycle (default)
    Adjust,

    /// Adjust periodically until interrupted
    Watch {
        /// Seconds between cycles (overrides `adjust_interval`)
        #[arg(long, short)]
        interval: Option<f64>,
    },

    /// Sample the ambient light and print the estimate
    Measure {
        /// Sampling window in seconds (overrides `capture_duration`)
        #[arg(long, short)]
        duration: Option<f64>,
    },

    /// Print the current display brightness
    Get,

    /// Set the display brightness directly
    Set {
        /// Brightness percentage, clamped to 0-100
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },

    /// Settings file management
    #[command(subcommand, about = "Show or create the settings file")]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Show the effective settings as JSON
    Show,
    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Whether this invocation runs the long-lived watch loop
    pub fn is_watch(&self) -> bool {
        matches!(self.command, Some(Commands::Watch { .. }))
    }
}

// ============================================================================
// CLI Execution
// ============================================================================

/// Run the selected command; `Ok(false)` means it ran but did not succeed
pub fn run_cli(cli: &Cli) -> anyhow::Result<bool> {
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command.as_ref().unwrap_or(&Commands::Adjust) {
        Commands::Adjust => cmd_adjust(&config_path),
        Commands::Watch { interval } => cmd_watch(&config_path, *interval),
        Commands::Measure { duration } => cmd_measure(&config_path, *duration),
        Commands::Get => cmd_get(&config_path),
        Commands::Set { percent } => cmd_set(&config_path, *percent),
        Commands::Config(sub) => cmd_config(&config_path, sub),
    }
}

/// Fail early when no camera backend was compiled in
fn ensure_camera_support() -> anyhow::Result<()> {
    if !CAMERA_SUPPORT {
        bail!(
            "lumen was built without webcam support; \
             rebuild with `cargo build -p lm-cli --features webcam`"
        );
    }
    Ok(())
}

fn cmd_adjust(config_path: &Path) -> anyhow::Result<bool> {
    ensure_camera_support()?;
    Ok(SystemAdjuster::load(Some(config_path)).adjust())
}

// ============================================================================
// Watch Command
// ============================================================================

fn cmd_watch(config_path: &Path, interval: Option<f64>) -> anyhow::Result<bool> {
    ensure_camera_support()?;
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received SIGINT/SIGTERM, stopping after the current cycle");
        flag.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to set signal handler: {}. Shutdown via signals may not be clean.", e);
    }

    info!("Watching ambient light (settings: {:?})", config_path);
    let (cycles, failures) = watch_loop(&shutdown, timing::WATCH_TICK, || {
        // Settings are re-read every cycle so edits apply without a restart
        let settings = load_settings(config_path);
        let period = watch_period(&settings, interval);
        (SystemAdjuster::from_settings(&settings).adjust(), period)
    });

    info!("Stopped after {} cycles ({} failed)", cycles, failures);
    Ok(true)
}

/// Run `cycle` until `shutdown` is set, waiting the period it returns
///
/// Returns the number of cycles run and how many of them failed.
fn watch_loop<F>(shutdown: &AtomicBool, tick: Duration, mut cycle: F) -> (u64, u64)
where
    F: FnMut() -> (bool, Duration),
{
    let mut cycles = 0_u64;
    let mut failures = 0_u64;

    while !shutdown.load(Ordering::SeqCst) {
        cycles += 1;
        let (succeeded, period) = cycle();
        if !succeeded {
            failures += 1;
            warn!("Adjustment cycle {} failed, retrying in {:?}", cycles, period);
        }

        if !wait_for_next_cycle(period, shutdown, tick) {
            break;
        }
    }

    (cycles, failures)
}

/// Period between watch cycles, honoring an explicit override
fn watch_period(settings: &Settings, interval: Option<f64>) -> Duration {
    match interval {
        Some(secs) => secs_to_duration(secs.max(timing::MIN_ADJUST_INTERVAL_SECS)),
        None => settings.adjust_period(),
    }
}

/// Sleep for `period` in `tick` slices; returns early once `shutdown` is set
fn wait_for_next_cycle(period: Duration, shutdown: &AtomicBool, tick: Duration) -> bool {
    let start = Instant::now();
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let elapsed = start.elapsed();
        if elapsed >= period {
            return true;
        }
        std::thread::sleep(tick.min(period - elapsed));
    }
}

// ============================================================================
// Measurement & Direct Control Commands
// ============================================================================

fn cmd_measure(config_path: &Path, duration: Option<f64>) -> anyhow::Result<bool> {
    ensure_camera_support()?;
    let settings = load_settings(config_path);
    let window = match duration {
        Some(secs) => {
            let brightness = settings.brightness;
            BrightnessConfig::new(
                i64::from(brightness.min_brightness()),
                i64::from(brightness.max_brightness()),
                secs,
            )
            .capture_window()
        }
        None => settings.brightness.capture_window(),
    };

    let sampler = AmbientLightSampler::new(default_backend(), settings.sampler);
    let estimate = sampler
        .measure(window)
        .context("Failed to measure ambient light")?;

    println!(
        "Ambient luminance: {:.2} / 255 ({} frames)",
        estimate.value, estimate.samples
    );
    Ok(true)
}

fn cmd_get(config_path: &Path) -> anyhow::Result<bool> {
    let settings = load_settings(config_path);
    let actuator = Actuator::new(LunarCli::new(settings.utility_path));
    let current = actuator
        .query()
        .context("Failed to read display brightness")?;
    println!("{}%", current);
    Ok(true)
}

fn cmd_set(config_path: &Path, percent: f64) -> anyhow::Result<bool> {
    let settings = load_settings(config_path);
    let actuator = Actuator::new(LunarCli::new(settings.utility_path));
    let applied = actuator
        .try_apply(percent)
        .context("Failed to set display brightness")?;
    println!("Display brightness set to {}%", applied);
    Ok(true)
}

// ============================================================================
// Config Commands
// ============================================================================

fn cmd_config(config_path: &Path, cmd: &ConfigCommands) -> anyhow::Result<bool> {
    match cmd {
        ConfigCommands::Show => {
            let settings = load_settings(config_path);
            println!("{}", serde_json::to_string_pretty(&settings.to_document())?);
        }
        ConfigCommands::Init { force } => {
            init_config(config_path, *force)?;
            println!("Wrote default settings to {}", config_path.display());
        }
    }
    Ok(true)
}

fn init_config(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }
    save_settings(config_path, &Settings::default())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(())
}
