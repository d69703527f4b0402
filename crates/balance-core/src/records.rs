//! Balance record types kept in sync with the CSV tables
//!
//! Each record is addressed by exactly one stable key field. Cross-table
//! references are stored as validated keys; `None` means the reference
//! did not resolve at import time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of per-level slots in card bonus and level weight arrays
pub const CARD_LEVEL_SLOTS: usize = 5;

/// One entry of a level's spawn table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Key into the enemy table, `None` when unresolved
    pub enemy: Option<String>,
    pub weight: f64,
    pub max_alive: i64,
    pub time_window: f64,
}

/// A game level, keyed by its number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub level_number: u32,
    pub duration: f64,
    pub spawn_interval: f64,
    pub difficulty: f64,
    pub spawn_mix: Vec<SpawnEntry>,
    /// Drop weights for card levels 1-5
    pub card_level_weights: [f64; CARD_LEVEL_SLOTS],
}

/// An enemy archetype, keyed by its string id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_max_health: f64,
    pub base_move_speed: f64,
    pub base_damage: f64,
    pub xp_value: i64,
    pub coin_drop_min: i64,
    pub coin_drop_max: i64,
}

/// A playable character, keyed by asset name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub asset_name: String,
    pub base_max_health: f64,
    pub base_move_speed: f64,
    pub base_damage: f64,
    pub attack_interval: f64,
    pub pickup_radius: f64,
}

/// Broad weapon behavior class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Melee,
    Ranged,
    Orbit,
    Area,
}

impl WeaponKind {
    /// Parse the table vocabulary; the Chinese column values and the
    /// canonical English names are both accepted
    pub fn parse(s: &str) -> Option<WeaponKind> {
        match s.trim() {
            "近战" => Some(WeaponKind::Melee),
            "远程" => Some(WeaponKind::Ranged),
            "环绕" => Some(WeaponKind::Orbit),
            "范围" => Some(WeaponKind::Area),
            other => match other.to_ascii_lowercase().as_str() {
                "melee" => Some(WeaponKind::Melee),
                "ranged" => Some(WeaponKind::Ranged),
                "orbit" => Some(WeaponKind::Orbit),
                "area" => Some(WeaponKind::Area),
                _ => None,
            },
        }
    }

    /// The value written back on export (table vocabulary)
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Melee => "近战",
            WeaponKind::Ranged => "远程",
            WeaponKind::Orbit => "环绕",
            WeaponKind::Area => "范围",
        }
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weapon or weapon upgrade stage, keyed by asset name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponRecord {
    pub asset_name: String,
    pub weapon_id: i64,
    pub kind: WeaponKind,
    pub damage: f64,
    pub cooldown: f64,
    pub projectile_count: i64,
    pub projectile_speed: f64,
    pub duration: f64,
    pub area: f64,
    /// Asset name of the next upgrade stage, same table, `None` when unresolved
    pub next_level: Option<String>,
}

/// Per-level bonus block of a card. A slot with `level == 0` has never
/// been written and is skipped on export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CardLevelBonus {
    pub level: u32,
    pub damage_bonus: f64,
    pub max_health_bonus: f64,
    pub move_speed_bonus: f64,
    pub attack_speed_bonus: f64,
    pub crit_chance_bonus: f64,
    pub cooldown_reduction: f64,
    pub pickup_radius_bonus: f64,
}

/// An upgrade card, keyed by numeric card type id. Multiple CSV rows
/// (one per level) populate one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_type_id: u32,
    pub name: String,
    pub description: String,
    /// Always exactly `CARD_LEVEL_SLOTS` slots, indexed by `level - 1`
    pub level_bonuses: [CardLevelBonus; CARD_LEVEL_SLOTS],
}
