//! Import of the old click counter's operation log.
//!
//! The old format is a JSON array of `[timestamp, label]` pairs, one per
//! click. It is replayed into a [`StatsStore`]; the store is never written
//! back in this format.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::StatsStore;
use crate::attributes::Attribute;
use crate::log;

/// Result of replaying an operation log.
#[derive(Debug, Clone)]
pub struct LegacyImport {
    pub store: StatsStore,
    /// Entries replayed into the store
    pub imported: usize,
    /// Entries that were malformed or named an unknown attribute
    pub skipped: usize,
}

/// Replays the operation log at `path` into a fresh store.
pub fn import_operation_log(path: &Path) -> Result<LegacyImport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read operation log: {}", path.display()))?;
    let entries: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Operation log is not a JSON array: {}", path.display()))?;

    let mut store = StatsStore::new();
    let mut imported = 0;
    let mut skipped = 0;

    for (idx, entry) in entries.iter().enumerate() {
        match entry_attribute(entry) {
            Some(attribute) => {
                store.increment(attribute, 1);
                imported += 1;
            }
            None => {
                log(&format!(
                    "Warning: Skipping operation log entry {}: {}",
                    idx + 1,
                    entry
                ));
                skipped += 1;
            }
        }
    }

    log(&format!(
        "Imported {} operations from {} ({} skipped)",
        imported,
        path.display(),
        skipped
    ));

    Ok(LegacyImport {
        store,
        imported,
        skipped,
    })
}

/// Extracts the attribute from a `[timestamp, label]` entry.
fn entry_attribute(entry: &Value) -> Option<Attribute> {
    match entry.as_array()?.as_slice() {
        [time, Value::String(label)] if time.is_number() => Attribute::from_name_or_label(label),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_import_labels_and_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_operations.json");
        fs::write(
            &path,
            r#"[[1716000000.5, "小攻击"], [1716000001.0, "暴击率"], [1716000002.0, "百分比攻击"], [1716000003.0, "暴击率"]]"#,
        )
        .unwrap();

        let result = import_operation_log(&path).unwrap();
        assert_eq!(result.imported, 4);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.store.count(Attribute::AttackFlat), 1);
        assert_eq!(result.store.count(Attribute::AttackPercent), 1);
        assert_eq!(result.store.count(Attribute::CritRate), 2);
    }

    #[test]
    fn test_import_skips_bad_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_operations.json");
        fs::write(
            &path,
            r#"[[1.0, "重击"], [2.0, "无效属性"], ["x", "重击"], [3.0], 42]"#,
        )
        .unwrap();

        let result = import_operation_log(&path).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 4);
        assert_eq!(result.store.count(Attribute::HeavyAttackDamage), 1);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data_operations.json");
        fs::write(&path, r#"{"暴击率": 1}"#).unwrap();
        assert!(import_operation_log(&path).is_err());
    }
}
