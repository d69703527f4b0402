//! Table schemas: localized header vocabularies mapped to canonical fields
//!
//! Each table declares a static array of [`ColumnSpec`] entries consumed
//! by the generic coercion loop in [`crate::coerce`]. The array order is
//! also the canonical column order on export.

use crate::error::{Error, Result};
use crate::records::CARD_LEVEL_SLOTS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The five balance tables the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Levels,
    Enemies,
    Characters,
    Weapons,
    Cards,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Levels => "levels",
            TableKind::Enemies => "enemies",
            TableKind::Characters => "characters",
            TableKind::Weapons => "weapons",
            TableKind::Cards => "cards",
        }
    }

    /// Parse a table name (case-insensitive)
    pub fn parse(s: &str) -> Option<TableKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "levels" => Some(TableKind::Levels),
            "enemies" => Some(TableKind::Enemies),
            "characters" => Some(TableKind::Characters),
            "weapons" => Some(TableKind::Weapons),
            "cards" => Some(TableKind::Cards),
            _ => None,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
}

/// One column declaration: localized header name, the canonical field it
/// maps to, its declared type, and whether a batch can run without it
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec<F> {
    pub header: &'static str,
    pub field: F,
    pub kind: FieldKind,
    pub required: bool,
}

/// Schema of one table: ordered column declarations
#[derive(Debug)]
pub struct TableSchema<F: 'static> {
    pub kind: TableKind,
    pub columns: &'static [ColumnSpec<F>],
}

impl<F: Copy + PartialEq + 'static> TableSchema<F> {
    /// Abort check: every required column must appear in the header row.
    /// Runs before any row is processed, so a failure writes nothing.
    pub fn validate(&self, headers: &HeaderMap) -> Result<()> {
        for col in self.columns {
            if col.required && headers.get(col.header).is_none() {
                return Err(Error::MissingColumn {
                    table: self.kind,
                    column: col.header.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Header row index: trimmed, case-folded cell -> column position.
/// First occurrence wins on duplicate headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap(BTreeMap<String, usize>);

impl HeaderMap {
    pub fn from_row(columns: &[String]) -> Self {
        let mut map = BTreeMap::new();
        for (index, name) in columns.iter().enumerate() {
            let key = name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            map.entry(key).or_insert(index);
        }
        HeaderMap(map)
    }

    pub fn get(&self, header: &str) -> Option<usize> {
        self.0.get(&header.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Canonical fields of the levels table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelField {
    Number,
    Duration,
    SpawnInterval,
    Difficulty,
    SpawnMix,
    CardWeight1,
    CardWeight2,
    CardWeight3,
    CardWeight4,
    CardWeight5,
}

impl LevelField {
    /// Card drop weight columns in slot order
    pub const CARD_WEIGHTS: [LevelField; CARD_LEVEL_SLOTS] = [
        LevelField::CardWeight1,
        LevelField::CardWeight2,
        LevelField::CardWeight3,
        LevelField::CardWeight4,
        LevelField::CardWeight5,
    ];
}

pub static LEVEL_SCHEMA: TableSchema<LevelField> = TableSchema {
    kind: TableKind::Levels,
    columns: &[
        ColumnSpec { header: "关卡", field: LevelField::Number, kind: FieldKind::Int, required: true },
        ColumnSpec { header: "时长", field: LevelField::Duration, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "刷怪间隔", field: LevelField::SpawnInterval, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "难度系数", field: LevelField::Difficulty, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "刷怪配置", field: LevelField::SpawnMix, kind: FieldKind::Text, required: false },
        ColumnSpec { header: "卡牌1权重", field: LevelField::CardWeight1, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "卡牌2权重", field: LevelField::CardWeight2, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "卡牌3权重", field: LevelField::CardWeight3, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "卡牌4权重", field: LevelField::CardWeight4, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "卡牌5权重", field: LevelField::CardWeight5, kind: FieldKind::Float, required: false },
    ],
};

/// Canonical fields of the enemies table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyField {
    Id,
    Name,
    Description,
    MaxHealth,
    MoveSpeed,
    Damage,
    Xp,
    CoinMin,
    CoinMax,
}

pub static ENEMY_SCHEMA: TableSchema<EnemyField> = TableSchema {
    kind: TableKind::Enemies,
    columns: &[
        ColumnSpec { header: "Id", field: EnemyField::Id, kind: FieldKind::Text, required: true },
        ColumnSpec { header: "名称", field: EnemyField::Name, kind: FieldKind::Text, required: true },
        ColumnSpec { header: "描述", field: EnemyField::Description, kind: FieldKind::Text, required: false },
        ColumnSpec { header: "基础生命", field: EnemyField::MaxHealth, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "基础移速", field: EnemyField::MoveSpeed, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "基础伤害", field: EnemyField::Damage, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "经验值", field: EnemyField::Xp, kind: FieldKind::Int, required: false },
        ColumnSpec { header: "掉落金币最小", field: EnemyField::CoinMin, kind: FieldKind::Int, required: false },
        ColumnSpec { header: "掉落金币最大", field: EnemyField::CoinMax, kind: FieldKind::Int, required: false },
    ],
};

/// Canonical fields of the characters table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterField {
    AssetName,
    MaxHealth,
    MoveSpeed,
    Damage,
    AttackInterval,
    PickupRadius,
}

pub static CHARACTER_SCHEMA: TableSchema<CharacterField> = TableSchema {
    kind: TableKind::Characters,
    columns: &[
        ColumnSpec { header: "资源名", field: CharacterField::AssetName, kind: FieldKind::Text, required: true },
        ColumnSpec { header: "基础生命", field: CharacterField::MaxHealth, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "基础移速", field: CharacterField::MoveSpeed, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "基础伤害", field: CharacterField::Damage, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "攻击间隔", field: CharacterField::AttackInterval, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "拾取范围", field: CharacterField::PickupRadius, kind: FieldKind::Float, required: false },
    ],
};

/// Canonical fields of the weapons table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponField {
    AssetName,
    WeaponId,
    Kind,
    Damage,
    Cooldown,
    ProjectileCount,
    ProjectileSpeed,
    Duration,
    Area,
    NextLevel,
}

pub static WEAPON_SCHEMA: TableSchema<WeaponField> = TableSchema {
    kind: TableKind::Weapons,
    columns: &[
        ColumnSpec { header: "资源名", field: WeaponField::AssetName, kind: FieldKind::Text, required: true },
        ColumnSpec { header: "武器ID", field: WeaponField::WeaponId, kind: FieldKind::Int, required: false },
        ColumnSpec { header: "类型", field: WeaponField::Kind, kind: FieldKind::Text, required: false },
        ColumnSpec { header: "伤害", field: WeaponField::Damage, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "冷却", field: WeaponField::Cooldown, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "弹体数量", field: WeaponField::ProjectileCount, kind: FieldKind::Int, required: false },
        ColumnSpec { header: "弹体速度", field: WeaponField::ProjectileSpeed, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "持续时间", field: WeaponField::Duration, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "范围", field: WeaponField::Area, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "下一级", field: WeaponField::NextLevel, kind: FieldKind::Text, required: false },
    ],
};

/// Canonical fields of the cards table (one row per level per card)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    CardId,
    Level,
    Name,
    Description,
    Damage,
    MaxHealth,
    MoveSpeed,
    AttackSpeed,
    CritChance,
    CooldownReduction,
    PickupRadius,
}

pub static CARD_SCHEMA: TableSchema<CardField> = TableSchema {
    kind: TableKind::Cards,
    columns: &[
        ColumnSpec { header: "卡牌ID", field: CardField::CardId, kind: FieldKind::Int, required: true },
        ColumnSpec { header: "等级", field: CardField::Level, kind: FieldKind::Int, required: true },
        ColumnSpec { header: "名称", field: CardField::Name, kind: FieldKind::Text, required: false },
        ColumnSpec { header: "描述", field: CardField::Description, kind: FieldKind::Text, required: false },
        ColumnSpec { header: "伤害加成", field: CardField::Damage, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "生命加成", field: CardField::MaxHealth, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "移速加成", field: CardField::MoveSpeed, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "攻速加成", field: CardField::AttackSpeed, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "暴击加成", field: CardField::CritChance, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "冷却缩减", field: CardField::CooldownReduction, kind: FieldKind::Float, required: false },
        ColumnSpec { header: "拾取范围加成", field: CardField::PickupRadius, kind: FieldKind::Float, required: false },
    ],
};
