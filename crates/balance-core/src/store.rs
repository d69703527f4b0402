//! Persisted record store for all balance tables
//!
//! The engine receives a store explicitly per call; there is no global
//! state. `BTreeMap`s keep iteration (and therefore export) order
//! deterministic. The whole store persists as one JSON file.

use crate::error::{Error, Result};
use crate::records::{CardRecord, CharacterRecord, EnemyRecord, LevelRecord, WeaponRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// All balance records, keyed per table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceStore {
    pub levels: BTreeMap<u32, LevelRecord>,
    pub enemies: BTreeMap<String, EnemyRecord>,
    pub characters: BTreeMap<String, CharacterRecord>,
    pub weapons: BTreeMap<String, WeaponRecord>,
    pub cards: BTreeMap<u32, CardRecord>,
}

impl BalanceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from JSON, or return an empty store if the file does
    /// not exist yet
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the store as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Total record count across all tables
    pub fn record_count(&self) -> usize {
        self.levels.len()
            + self.enemies.len()
            + self.characters.len()
            + self.weapons.len()
            + self.cards.len()
    }

    // Upsert accessors: look up by key, create a keyed default record on
    // miss. The same key always resolves to the same record, which is
    // what makes re-imports idempotent.

    pub fn level_mut(&mut self, number: u32) -> &mut LevelRecord {
        self.levels.entry(number).or_insert_with(|| LevelRecord {
            level_number: number,
            ..Default::default()
        })
    }

    pub fn enemy_mut(&mut self, id: &str) -> &mut EnemyRecord {
        self.enemies
            .entry(id.to_string())
            .or_insert_with(|| EnemyRecord {
                id: id.to_string(),
                ..Default::default()
            })
    }

    pub fn character_mut(&mut self, asset_name: &str) -> &mut CharacterRecord {
        self.characters
            .entry(asset_name.to_string())
            .or_insert_with(|| CharacterRecord {
                asset_name: asset_name.to_string(),
                ..Default::default()
            })
    }

    pub fn weapon_mut(&mut self, asset_name: &str) -> &mut WeaponRecord {
        self.weapons
            .entry(asset_name.to_string())
            .or_insert_with(|| WeaponRecord {
                asset_name: asset_name.to_string(),
                ..Default::default()
            })
    }

    pub fn card_mut(&mut self, card_type_id: u32) -> &mut CardRecord {
        self.cards.entry(card_type_id).or_insert_with(|| CardRecord {
            card_type_id,
            ..Default::default()
        })
    }

    // Reference index: foreign-key lookups used by the resolver

    pub fn has_enemy(&self, id: &str) -> bool {
        self.enemies.contains_key(id)
    }

    pub fn has_weapon(&self, asset_name: &str) -> bool {
        self.weapons.contains_key(asset_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_creates_keyed_record() {
        let mut store = BalanceStore::new();
        let enemy = store.enemy_mut("Enemy01");
        assert_eq!(enemy.id, "Enemy01");
        assert_eq!(store.enemies.len(), 1);
    }

    #[test]
    fn test_same_key_resolves_to_same_record() {
        let mut store = BalanceStore::new();
        store.enemy_mut("Enemy01").base_damage = 5.0;
        store.enemy_mut("Enemy01").xp_value = 7;

        assert_eq!(store.enemies.len(), 1);
        let enemy = &store.enemies["Enemy01"];
        assert_eq!(enemy.base_damage, 5.0);
        assert_eq!(enemy.xp_value, 7);
    }

    #[test]
    fn test_load_missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = BalanceStore::load(dir.path().join("missing.json")).unwrap();
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = BalanceStore::new();
        store.enemy_mut("Enemy01").name = "基础怪".to_string();
        store.level_mut(3).duration = 90.0;
        store.card_mut(12).name = "火球".to_string();
        store.save(&path).unwrap();

        let loaded = BalanceStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }
}
