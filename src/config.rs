//! Configuration for the tracker.
//!
//! Two files live next to the executable:
//! - `settings.json`: application settings, loaded once at startup. Every
//!   field is optional; missing or malformed files fall back to defaults.
//! - `config.json`: the OCR.space API key, loaded at startup and saved
//!   whenever the user edits it in the GUI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::paths;
use crate::stats::SortMode;

/// Global settings instance, initialized once at startup.
static SETTINGS: OnceLock<AppSettings> = OnceLock::new();

/// Which panel the window opens with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Screenshot recognition
    #[default]
    Ocr,
    /// Click counter
    Manual,
}

/// OCR.space request parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Endpoint the image is posted to
    pub endpoint: String,
    /// OCR language code (`chs` = Simplified Chinese)
    pub language: String,
    /// OCR engine selector (1 or 2)
    pub ocr_engine: u8,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Images larger than this are shrunk before upload; 0 disables
    pub max_upload_bytes: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.ocr.space/parse/image".to_string(),
            language: "chs".to_string(),
            ocr_engine: 2,
            timeout_secs: 30,
            // Free tier upload limit
            max_upload_bytes: 1024 * 1024,
        }
    }
}

/// Complete application settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Panel shown at startup
    pub start_mode: StartMode,
    /// Statistics file, relative paths are resolved against the executable directory
    pub stats_file: PathBuf,
    /// Initial table sort order
    pub sort_mode: SortMode,
    /// How many manual clicks can be undone
    pub undo_capacity: usize,
    /// OCR request parameters
    pub ocr: OcrSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            start_mode: StartMode::default(),
            stats_file: PathBuf::from("data").join("echo_stats.json"),
            sort_mode: SortMode::default(),
            undo_capacity: 20,
            ocr: OcrSettings::default(),
        }
    }
}

impl AppSettings {
    /// Absolute path of the statistics file.
    pub fn stats_path(&self) -> PathBuf {
        paths::resolve(&self.stats_file)
    }
}

/// Loads settings from `path`, or returns defaults if it is missing or invalid.
pub fn load_settings(path: &Path) -> AppSettings {
    crate::log(&format!("Looking for settings at: {}", path.display()));

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    crate::log("Settings loaded from settings.json");
                    return settings;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse settings.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read settings.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("settings.json not found. Using default settings.");
    }

    AppSettings::default()
}

/// Initializes the global settings. Call once at startup.
pub fn init_settings() {
    let _ = SETTINGS.set(load_settings(&paths::get_settings_path()));
}

/// Returns a reference to the global settings.
/// Panics if called before init_settings().
pub fn get_settings() -> &'static AppSettings {
    SETTINGS
        .get()
        .expect("Settings not initialized. Call init_settings() first.")
}

/// Contents of `config.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ApiKeyFile {
    #[serde(default)]
    api_key: String,
}

/// Loads the API key. Returns None if the file is missing, unreadable, or
/// holds an empty key.
pub fn load_api_key(path: &Path) -> Option<String> {
    if !path.exists() {
        crate::log(&format!("Config file {} not found.", path.display()));
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            crate::log(&format!("Error reading {}: {}", path.display(), e));
            return None;
        }
    };

    match serde_json::from_str::<ApiKeyFile>(&contents) {
        Ok(file) if !file.api_key.trim().is_empty() => {
            crate::log(&format!("API key loaded from {}", path.display()));
            Some(file.api_key)
        }
        Ok(_) => {
            crate::log(&format!("API key not found in {}.", path.display()));
            None
        }
        Err(e) => {
            crate::log(&format!(
                "Error decoding JSON from {}: {}. File might be corrupted.",
                path.display(),
                e
            ));
            None
        }
    }
}

/// Saves the API key, overwriting the whole file.
pub fn save_api_key(path: &Path, api_key: &str) -> Result<()> {
    let file = ApiKeyFile {
        api_key: api_key.to_string(),
    };
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize API key")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    crate::log(&format!("API key saved to {}", path.display()));
    Ok(())
}
