//! Constants and configuration values for Lumen
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! Other modules refer to these instead of repeating literals.

use std::time::Duration;

/// Display brightness range and defaults (percent)
pub mod brightness {
    /// Lowest brightness the utility accepts
    pub const MIN_PERCENT: i64 = 0;

    /// Highest brightness the utility accepts
    pub const MAX_PERCENT: i64 = 100;

    /// Default lower bound of the mapped output range
    pub const DEFAULT_MIN: u8 = 35;

    /// Default upper bound of the mapped output range
    pub const DEFAULT_MAX: u8 = 80;
}

/// Luminance scale of a grayscale frame
pub mod luminance {
    /// Brightest possible 8-bit grayscale value
    pub const MAX_LEVEL: f64 = 255.0;
}

/// Sampling and scheduling timing
pub mod timing {
    use super::Duration;

    /// Default sampling window in seconds
    pub const DEFAULT_CAPTURE_DURATION_SECS: f64 = 1.0;

    /// Shortest sampling window accepted after validation
    pub const MIN_CAPTURE_DURATION_SECS: f64 = 0.1;

    /// Delay after opening the camera before the first frame (exposure settles)
    pub const DEFAULT_WARMUP: Duration = Duration::from_secs(2);

    /// Pause between two successful frame reads
    pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

    /// Pause after a failed frame read before trying again
    pub const FRAME_RETRY_DELAY: Duration = Duration::from_millis(100);

    /// Default period between two adjustments in watch mode
    pub const DEFAULT_ADJUST_INTERVAL_SECS: f64 = 300.0;

    /// Shortest watch-mode period accepted after validation
    pub const MIN_ADJUST_INTERVAL_SECS: f64 = 1.0;

    /// Granularity of the watch-mode sleep, bounds shutdown latency
    pub const WATCH_TICK: Duration = Duration::from_millis(200);
}

/// Camera selection
pub mod camera {
    /// Default capture device index
    pub const DEFAULT_INDEX: u32 = 0;
}

/// External brightness utility
pub mod utility {
    /// Default utility program, resolved through PATH
    pub const DEFAULT_PROGRAM: &str = "lunar";

    /// Sub-command used to change a display property
    pub const SET_COMMAND: &str = "set";

    /// Sub-command used to read a display property
    pub const GET_COMMAND: &str = "get";

    /// Display property controlled by Lumen
    pub const BRIGHTNESS_PROPERTY: &str = "brightness";
}

/// Log file written by the binary
pub mod logging {
    /// Log file name inside the log directory
    pub const FILE_NAME: &str = "lumen.log";

    /// Size at which the log file is rotated (1 MiB)
    pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

    /// Rotated files kept next to the active one (`lumen.log.1` .. `.3`)
    pub const BACKUP_COUNT: usize = 3;
}

/// Settings file locations
pub mod paths {
    use std::path::PathBuf;

    /// Environment variable overriding the settings file location
    pub const CONFIG_ENV: &str = "LUMEN_CONFIG";

    /// Application directory name under the user config dir
    pub const APP_DIR: &str = "lumen";

    /// Settings file name
    pub const CONFIG_FILE: &str = "config.json";

    /// Environment variable overriding the log file location
    pub const LOG_FILE_ENV: &str = "LUMEN_LOG_FILE";

    /// Log directory name under the application data dir
    pub const LOG_DIR: &str = "logs";

    /// User configuration directory
    ///
    /// Prefers `XDG_CONFIG_HOME`, then `$HOME/.config`, then the platform
    /// default from `dirs`.
    pub fn user_config_dir() -> Option<PathBuf> {
        let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".config"))
        } else {
            dirs::config_dir()
        };

        base.map(|p| p.join(APP_DIR))
    }

    /// Directory holding the log file
    ///
    /// The platform local data dir from `dirs` (`~/.local/share`,
    /// `~/Library/Application Support`), falling back to the config dir.
    pub fn user_log_dir() -> Option<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join(APP_DIR))
            .or_else(user_config_dir)
            .map(|p| p.join(LOG_DIR))
    }

    /// Log file location, `LUMEN_LOG_FILE` first
    pub fn log_file() -> Option<PathBuf> {
        match std::env::var(LOG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => user_log_dir().map(|dir| dir.join(super::logging::FILE_NAME)),
        }
    }
}
