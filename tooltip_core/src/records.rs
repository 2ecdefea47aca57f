//! Static modifier metadata, keyed by raw modifier identifier.
//!
//! The overlay only ever reads this data. Records are loaded from a directory of
//! TOML files, each holding one or more `[[mods]]` entries:
//!
//! ```toml
//! [[mods]]
//! key = "LocalIncreasedPhysicalDamagePercent8"
//! group = "LocalPhysicalDamagePercent"
//! affix_type = "prefix"
//! min_level = 83
//! name = "Merciless"
//! stats = [{ key = "local_physical_damage_+%", min = 170, max = 179 }]
//! ```

use crate::config::{parse_toml_with_context, read_dir_with_context, read_file_with_context, ConfigError};
use crate::types::{ModDomain, ModType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A stat granted by a modifier, with its rollable range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub key: String,
    #[serde(default)]
    pub min: i32,
    #[serde(default)]
    pub max: i32,
}

impl StatEntry {
    /// A (0, 0) range marks a stat that does nothing on this item
    pub fn is_inert(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// Static metadata for one modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRecord {
    /// Raw identifier; trailing digits rank the record within its group
    pub key: String,
    pub group: String,
    pub affix_type: ModType,
    #[serde(default)]
    pub domain: ModDomain,
    /// Tier label embedded in the data, e.g. "Tier 3"
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub min_level: u32,
    /// User friendly affix name, e.g. "Tyrannical"
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

impl ModRecord {
    pub fn has_stats(&self) -> bool {
        self.stats.iter().any(|s| !s.key.is_empty())
    }

    pub fn first_stat_key(&self) -> Option<&str> {
        self.stats
            .first()
            .map(|s| s.key.as_str())
            .filter(|k| !k.is_empty())
    }
}

/// Read-only access to modifier metadata
pub trait ModRecordLookup {
    /// Look up a record by its raw identifier
    fn record(&self, key: &str) -> Option<&ModRecord>;

    /// All records sharing a group and affix type, in dataset order
    fn siblings(&self, group: &str, affix_type: ModType) -> Option<&[ModRecord]>;
}

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct ModRecordStore {
    records: HashMap<String, ModRecord>,
    by_tier: HashMap<(String, ModType), Vec<ModRecord>>,
}

impl ModRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in dataset order. Later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = ModRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&mut self, record: ModRecord) {
        let siblings = self
            .by_tier
            .entry((record.group.clone(), record.affix_type))
            .or_default();
        match siblings.iter_mut().find(|r| r.key == record.key) {
            Some(existing) => *existing = record.clone(),
            None => siblings.push(record.clone()),
        }
        self.records.insert(record.key.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load all record files from a directory.
    ///
    /// Files are visited in name order so sibling order is reproducible.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut store = Self::new();

        if !dir.exists() {
            return Ok(store);
        }

        let mut paths = Vec::new();
        for entry in read_dir_with_context(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = read_file_with_context(&path)?;
            let wrapper: ModsWrapper = parse_toml_with_context(&content, &path)?;
            for record in wrapper.mods {
                if store.records.contains_key(&record.key) {
                    return Err(ConfigError::DuplicateRecord {
                        key: record.key,
                        path,
                    });
                }
                store.insert(record);
            }
        }

        tracing::debug!(records = store.len(), dir = %dir.display(), "loaded mod records");
        Ok(store)
    }
}

impl ModRecordLookup for ModRecordStore {
    fn record(&self, key: &str) -> Option<&ModRecord> {
        self.records.get(key)
    }

    fn siblings(&self, group: &str, affix_type: ModType) -> Option<&[ModRecord]> {
        self.by_tier
            .get(&(group.to_string(), affix_type))
            .map(Vec::as_slice)
    }
}

// Wrapper type for TOML parsing

#[derive(Deserialize)]
struct ModsWrapper {
    #[serde(default)]
    mods: Vec<ModRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, group: &str, affix_type: ModType) -> ModRecord {
        ModRecord {
            key: key.to_string(),
            group: group.to_string(),
            affix_type,
            domain: ModDomain::Item,
            tier: String::new(),
            min_level: 1,
            name: String::new(),
            stats: Vec::new(),
        }
    }

    #[test]
    fn test_siblings_keep_insertion_order() {
        let store = ModRecordStore::from_records([
            record("Life3", "Life", ModType::Prefix),
            record("Life1", "Life", ModType::Prefix),
            record("Life2", "Life", ModType::Prefix),
            record("LifeSuffix1", "Life", ModType::Suffix),
        ]);
        let keys: Vec<_> = store
            .siblings("Life", ModType::Prefix)
            .unwrap()
            .iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, ["Life3", "Life1", "Life2"]);
        assert_eq!(store.siblings("Life", ModType::Suffix).unwrap().len(), 1);
        assert!(store.siblings("Mana", ModType::Prefix).is_none());
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut store = ModRecordStore::from_records([
            record("Life1", "Life", ModType::Prefix),
            record("Life2", "Life", ModType::Prefix),
        ]);
        let mut updated = record("Life1", "Life", ModType::Prefix);
        updated.min_level = 44;
        store.insert(updated);
        let siblings = store.siblings("Life", ModType::Prefix).unwrap();
        assert_eq!(siblings.len(), 2);
        assert_eq!(siblings[0].min_level, 44);
        assert_eq!(store.record("Life1").unwrap().min_level, 44);
    }

    #[test]
    fn test_parse_mods_file() {
        let wrapper: ModsWrapper = toml::from_str(
            r#"
            [[mods]]
            key = "Strength1"
            group = "Strength"
            affix_type = "suffix"
            stats = [{ key = "additional_strength", min = 8, max = 12 }]

            [[mods]]
            key = "StrengthMaster"
            group = "Strength"
            affix_type = "suffix"
            domain = "crafted"
            "#,
        )
        .unwrap();
        assert_eq!(wrapper.mods.len(), 2);
        assert_eq!(wrapper.mods[0].first_stat_key(), Some("additional_strength"));
        assert_eq!(wrapper.mods[1].domain, ModDomain::Crafted);
        assert!(!wrapper.mods[1].has_stats());
    }

    #[test]
    fn test_missing_dir_is_empty_store() {
        let store = ModRecordStore::load_from_dir(Path::new("does/not/exist")).unwrap();
        assert!(store.is_empty());
    }
}
