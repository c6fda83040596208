//! Echo Sub-stat Tracker
//!
//! A desktop tool that counts how often each Wuthering Waves echo sub-stat
//! shows up, either from manual clicks or from screenshots recognized by the
//! OCR.space web service.

// Hide console window on Windows for GUI mode
#![windows_subsystem = "windows"]

mod attributes;
mod config;
mod gui;
mod ocr;
mod paths;
mod stats;

use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

const LOG_FILE_NAME: &str = "echo_tracker.log";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    append_to_log_file(&line);
}

fn append_to_log_file(line: &str) {
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        append_to_log_file(&log_msg);
    }));

    // Ensure output directories exist
    paths::ensure_directories()?;

    // Load configuration
    config::init_settings();
    let settings = config::get_settings().clone();

    let store = stats::load_startup_store(&settings.stats_path(), &paths::get_legacy_log_path());

    log("Starting GUI application...");
    match gui::run_gui(settings, store) {
        Ok(()) => {
            log("GUI application exited normally");
            Ok(())
        }
        Err(e) => {
            log(&format!("GUI error: {}", e));
            Err(anyhow!("GUI error: {}", e))
        }
    }
}
