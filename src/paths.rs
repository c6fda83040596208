use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the settings file: `<exe_dir>/settings.json`
pub fn get_settings_path() -> PathBuf {
    get_exe_dir().join("settings.json")
}

/// Returns the API key file: `<exe_dir>/config.json`
pub fn get_api_key_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the operation log written by the old click counter:
/// `<exe_dir>/data_operations.json`
pub fn get_legacy_log_path() -> PathBuf {
    get_exe_dir().join("data_operations.json")
}

/// Resolves a configured path: absolute paths are kept, relative paths are
/// taken relative to the executable directory.
pub fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        get_exe_dir().join(path)
    }
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let resolved = resolve(Path::new("data/echo_stats.json"));
        assert!(resolved.starts_with(get_exe_dir()));
        assert!(resolved.ends_with("data/echo_stats.json"));
    }

    #[test]
    fn test_resolve_absolute() {
        let absolute = get_exe_dir().join("elsewhere.json");
        assert_eq!(resolve(&absolute), absolute);
    }
}
