use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    copy_settings_template();
}

/// Returns target/release (or target/debug).
/// OUT_DIR is something like target/release/build/echo-substat-tracker-xxx/out.
fn target_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .nth(3) // out -> hash -> build -> release
        .map(Path::to_path_buf)
}

/// Copies the default settings.json next to the executable.
/// An existing settings.json there is kept.
fn copy_settings_template() {
    let src = Path::new("resources/settings.json");
    println!("cargo:rerun-if-changed=resources/settings.json");

    let Some(target_dir) = target_dir() else {
        return;
    };
    let dst = target_dir.join("settings.json");

    if src.exists() && !dst.exists() {
        let _ = fs::copy(src, &dst);
    }
}
