//! Cumulative attribute counts.
//!
//! Counts are kept in display order. The store is persisted as a flat JSON
//! object mapping in-game attribute names to counts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::attributes::Attribute;
use crate::log;
use crate::ocr::AttributeCounts;

/// Table ordering chosen by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Most frequent first
    #[default]
    Descending,
    /// Least frequent first
    Ascending,
    /// Display order
    Unsorted,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Descending, SortMode::Ascending, SortMode::Unsorted];

    /// Label shown in the sort selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Descending => "降序",
            Self::Ascending => "升序",
            Self::Unsorted => "不排序",
        }
    }
}

/// One row of the statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub attribute: Attribute,
    pub count: u32,
    /// Fraction of the total (0.0 to 1.0)
    pub share: f64,
}

/// Occurrence count per attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsStore {
    counts: [u32; Attribute::COUNT],
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, attribute: Attribute) -> u32 {
        self.counts[attribute.index()]
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn increment(&mut self, attribute: Attribute, delta: u32) {
        let slot = &mut self.counts[attribute.index()];
        *slot = slot.saturating_add(delta);
    }

    /// Removes up to `delta` occurrences. Counts never go below zero.
    /// Returns false if the count was already zero.
    pub fn decrement(&mut self, attribute: Attribute, delta: u32) -> bool {
        let slot = &mut self.counts[attribute.index()];
        if *slot == 0 {
            return false;
        }
        *slot = slot.saturating_sub(delta);
        true
    }

    /// Adds every count found in one image.
    pub fn merge(&mut self, found: &AttributeCounts) {
        for (&attribute, &count) in found {
            self.increment(attribute, count);
        }
    }

    /// Fraction of all occurrences that are `attribute`; 0 when nothing has
    /// been recorded yet.
    pub fn share(&self, attribute: Attribute) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(attribute) as f64 / total as f64
        }
    }

    /// All 13 attributes as table rows, ordered by `sort`. Ties keep display order.
    pub fn rows(&self, sort: SortMode) -> Vec<StatRow> {
        let mut rows: Vec<StatRow> = Attribute::ALL
            .into_iter()
            .map(|attribute| StatRow {
                attribute,
                count: self.count(attribute),
                share: self.share(attribute),
            })
            .collect();

        match sort {
            SortMode::Descending => rows.sort_by(|a, b| b.count.cmp(&a.count)),
            SortMode::Ascending => rows.sort_by(|a, b| a.count.cmp(&b.count)),
            SortMode::Unsorted => {}
        }

        rows
    }

    pub fn clear(&mut self) {
        self.counts = [0; Attribute::COUNT];
    }

    /// Flat name → count map, the persisted form.
    fn to_map(&self) -> BTreeMap<String, u32> {
        Attribute::ALL
            .into_iter()
            .map(|a| (a.name().to_string(), self.count(a)))
            .collect()
    }

    /// Saves the counts as a pretty-printed JSON object, overwriting the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.to_map())
            .context("Failed to serialize statistics to JSON")?;

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create stats file: {}", path.display()))?;
        file.write_all(json.as_bytes())
            .context("Failed to write statistics")?;

        log(&format!("Statistics saved to {}", path.display()));
        Ok(())
    }

    /// Loads counts from a JSON object. Names that are not attributes are
    /// skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats file: {}", path.display()))?;
        let map: BTreeMap<String, u32> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stats file: {}", path.display()))?;

        let mut store = Self::new();
        for (name, count) in map {
            match Attribute::from_name(&name) {
                Some(attribute) => store.increment(attribute, count),
                None => log(&format!(
                    "Warning: Skipping unknown attribute '{}' in {}",
                    name,
                    path.display()
                )),
            }
        }

        Ok(store)
    }

    /// Loads counts, starting empty if the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log("No statistics file found. Starting with empty stats.");
            return Self::new();
        }

        match Self::load(path) {
            Ok(store) => {
                log(&format!(
                    "Loaded statistics from {} ({} total)",
                    path.display(),
                    store.total()
                ));
                store
            }
            Err(e) => {
                log(&format!(
                    "Error loading statistics: {:#}. Starting with empty stats.",
                    e
                ));
                Self::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_increment_then_undo_restores_count() {
        let mut store = StatsStore::new();
        store.increment(Attribute::CritRate, 3);

        store.increment(Attribute::CritRate, 1);
        assert!(store.decrement(Attribute::CritRate, 1));
        assert_eq!(store.count(Attribute::CritRate), 3);
    }

    #[test]
    fn test_decrement_never_negative() {
        let mut store = StatsStore::new();
        assert!(!store.decrement(Attribute::HpFlat, 1));
        assert_eq!(store.count(Attribute::HpFlat), 0);

        store.increment(Attribute::HpFlat, 1);
        assert!(store.decrement(Attribute::HpFlat, 5));
        assert_eq!(store.count(Attribute::HpFlat), 0);
    }

    #[test]
    fn test_share_with_empty_store() {
        let store = StatsStore::new();
        for attribute in Attribute::ALL {
            assert_eq!(store.share(attribute), 0.0);
        }
        assert!(store.rows(SortMode::Descending).iter().all(|r| r.share == 0.0));
    }

    #[test]
    fn test_share() {
        let mut store = StatsStore::new();
        store.increment(Attribute::CritRate, 1);
        store.increment(Attribute::CritDamage, 3);
        assert_eq!(store.total(), 4);
        assert!((store.share(Attribute::CritRate) - 0.25).abs() < 1e-9);
        assert!((store.share(Attribute::CritDamage) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_merge() {
        let mut found = AttributeCounts::new();
        found.insert(Attribute::CritRate, 2);
        found.insert(Attribute::AttackPercent, 1);

        let mut store = StatsStore::new();
        store.increment(Attribute::CritRate, 1);
        store.merge(&found);

        assert_eq!(store.count(Attribute::CritRate), 3);
        assert_eq!(store.count(Attribute::AttackPercent), 1);
        assert_eq!(store.total(), 4);
    }

    #[test]
    fn test_rows_sorting() {
        let mut store = StatsStore::new();
        store.increment(Attribute::EnergyRegen, 5);
        store.increment(Attribute::CritDamage, 2);

        let desc = store.rows(SortMode::Descending);
        assert_eq!(desc.len(), Attribute::COUNT);
        assert_eq!(desc[0].attribute, Attribute::EnergyRegen);
        assert_eq!(desc[1].attribute, Attribute::CritDamage);
        // Ties keep display order
        assert_eq!(desc[2].attribute, Attribute::CritRate);

        let asc = store.rows(SortMode::Ascending);
        assert_eq!(asc[0].attribute, Attribute::CritRate);
        assert_eq!(asc[Attribute::COUNT - 1].attribute, Attribute::EnergyRegen);

        let unsorted = store.rows(SortMode::Unsorted);
        let order: Vec<Attribute> = unsorted.iter().map(|r| r.attribute).collect();
        assert_eq!(order, Attribute::ALL.to_vec());
    }

    #[test]
    fn test_clear() {
        let mut store = StatsStore::new();
        store.increment(Attribute::SkillDamage, 4);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("echo_stats.json");

        let mut store = StatsStore::new();
        store.increment(Attribute::CritRate, 7);
        store.increment(Attribute::HeavyAttackDamage, 2);
        store.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"暴击率\": 7"));

        let loaded = StatsStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_skips_unknown_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("echo_stats.json");
        fs::write(&path, r#"{"暴击伤害": 3, "无效属性": 9}"#).unwrap();

        let store = StatsStore::load(&path).unwrap();
        assert_eq!(store.count(Attribute::CritDamage), 3);
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn test_load_or_default_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("echo_stats.json");
        assert!(StatsStore::load_or_default(&path).is_empty());

        fs::write(&path, "{ corrupt").unwrap();
        assert!(StatsStore::load(&path).is_err());
        assert!(StatsStore::load_or_default(&path).is_empty());

        // Negative counts are not valid
        fs::write(&path, r#"{"暴击率": -1}"#).unwrap();
        assert!(StatsStore::load_or_default(&path).is_empty());
    }
}
