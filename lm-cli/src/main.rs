//! Lumen command line tool (lumen)
//!
//! Runs one ambient-light adjustment cycle by default, or one of the
//! sub-commands in [`cli::Commands`]. The exit status is 0 when the command
//! succeeded and 1 otherwise.
//!
//! Logs go to stderr (or to the systemd journal in `watch` mode when its
//! socket is present) and to a size-rotated file under the user data dir.

mod cli;
mod logfile;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use lm_core::constants::{logging, paths};
use logfile::RotatingFile;

/// Environment variable holding the log filter
const LOG_ENV: &str = "LUMEN_LOG";

const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let use_journald = args.is_watch() && Path::new(JOURNALD_SOCKET).exists();
    init_logging(args.verbose, use_journald, paths::log_file());
    debug!("Lumen {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run_cli(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: Option<PathBuf>) -> Option<RotatingFile> {
    let path = path?;
    match RotatingFile::open(&path, logging::MAX_FILE_BYTES, logging::BACKUP_COUNT) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "Failed to open log file {}: {}, continuing without it",
                path.display(),
                e
            );
            None
        }
    }
}

fn init_logging(verbose: bool, use_journald: bool, log_path: Option<PathBuf>) {
    let journald = if use_journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
                None
            }
        }
    } else {
        None
    };

    let stderr = journald.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(log_filter(verbose))
        .with(journald)
        .with(stderr)
        .with(open_log_file(log_path).map(logfile::file_layer))
        .init();
}
