//! JSON persistence for settings
//!
//! Loading never fails: a missing, unreadable or malformed file falls back to
//! defaults with a notice. Saving is atomic (temp file + rename).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::paths;
use crate::data::config::Settings;
use crate::error::{LumenError, Result};

/// Resolve the settings file location
///
/// Order: explicit path, `LUMEN_CONFIG`, the user config directory, then
/// `config.json` in the working directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(env_path) = std::env::var(paths::CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }
    paths::user_config_dir()
        .map(|dir| dir.join(paths::CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(paths::CONFIG_FILE))
}

/// Load settings from `path`, falling back to defaults where needed
pub fn load_settings(path: &Path) -> Settings {
    let settings = match read_document(path) {
        Some(doc) => {
            info!("Loaded settings file {:?}", path);
            Settings::from_json(&doc)
        }
        None => Settings::default(),
    };

    info!(
        min_brightness = settings.brightness.min_brightness(),
        max_brightness = settings.brightness.max_brightness(),
        capture_duration = settings.brightness.capture_duration(),
        "Using brightness range {}-{}%, capture {}s",
        settings.brightness.min_brightness(),
        settings.brightness.max_brightness(),
        settings.brightness.capture_duration()
    );
    settings
}

fn read_document(path: &Path) -> Option<Value> {
    if !path.exists() {
        info!("Settings file {:?} not found, using defaults", path);
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to read settings file {:?}: {}, using defaults", path, e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Settings file {:?} is not valid JSON ({}), using defaults", path, e);
            None
        }
    }
}

/// Write settings to `path` as pretty JSON
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| LumenError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(&settings.to_document())?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| LumenError::FileWrite {
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .and_then(|_| file.sync_all())
        .map_err(|e| LumenError::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| LumenError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Saved settings to {:?}", path);
    Ok(())
}
