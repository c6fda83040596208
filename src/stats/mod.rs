//! Attribute statistics.
//!
//! This module provides:
//! - The cumulative count store with sorting, percentages and JSON persistence
//! - The bounded undo history used by the click counter
//! - Import of the old operation-log format

pub mod history;
pub mod legacy;
pub mod store;

pub use history::RecentOperations;
pub use legacy::import_operation_log;
pub use store::{SortMode, StatsStore};

use std::path::Path;

use crate::log;

/// Loads the statistics file. When it does not exist yet but an old operation
/// log does, the log is replayed instead so earlier clicks are not lost.
pub fn load_startup_store(stats_path: &Path, legacy_log_path: &Path) -> StatsStore {
    if !stats_path.exists() && legacy_log_path.exists() {
        match import_operation_log(legacy_log_path) {
            Ok(import) => {
                log(&format!(
                    "Starting from operation log: {} clicks ({} skipped)",
                    import.imported, import.skipped
                ));
                return import.store;
            }
            Err(e) => log(&format!("Failed to import operation log: {:#}", e)),
        }
    }

    StatsStore::load_or_default(stats_path)
}
