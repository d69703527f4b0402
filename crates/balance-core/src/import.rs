//! Import engine: one CSV batch in, upserted records plus a report out
//!
//! Batch flow: parse, build the header map, validate required columns
//! (fatal on miss, nothing written), then a single pass over the rows.
//! Each row is coerced into a staging context first; only rows that pass
//! required-field coercion touch the store, so a failed row never
//! partially mutates a record. Cross-references resolve best-effort:
//! a miss leaves the reference empty and warns, it never fails the row.

use crate::coerce::{coerce_row, FieldValue};
use crate::error::Result;
use crate::parser;
use crate::records::{SpawnEntry, WeaponKind, CARD_LEVEL_SLOTS};
use crate::report::ImportReport;
use crate::schema::{
    CardField, CharacterField, EnemyField, HeaderMap, LevelField, TableKind, WeaponField,
    CARD_SCHEMA, CHARACTER_SCHEMA, ENEMY_SCHEMA, LEVEL_SCHEMA, WEAPON_SCHEMA,
};
use crate::store::BalanceStore;
use crate::table::RawTable;
use std::path::Path;

/// Import one table file into the store
pub fn import_path<P: AsRef<Path>>(
    store: &mut BalanceStore,
    kind: TableKind,
    path: P,
) -> Result<ImportReport> {
    let table = parser::parse_path(path)?;
    import_table(store, kind, table)
}

/// Import CSV text into the store (tests and in-memory callers)
pub fn import_str(
    store: &mut BalanceStore,
    kind: TableKind,
    content: &str,
    source_name: &str,
) -> Result<ImportReport> {
    let table = parser::parse_str(content, source_name)?;
    import_table(store, kind, table)
}

fn import_table(store: &mut BalanceStore, kind: TableKind, table: RawTable) -> Result<ImportReport> {
    let mut report = ImportReport::new(kind, table.source_name.clone());
    tracing::debug!(table = %kind, source = %table.source_name, rows = table.rows.len(), "importing table");

    match kind {
        TableKind::Levels => import_levels(store, &table, &mut report)?,
        TableKind::Enemies => import_enemies(store, &table, &mut report)?,
        TableKind::Characters => import_characters(store, &table, &mut report)?,
        TableKind::Weapons => import_weapons(store, &table, &mut report)?,
        TableKind::Cards => import_cards(store, &table, &mut report)?,
    }

    report.finish();
    tracing::debug!(table = %kind, summary = %report.summary(), "import finished");
    Ok(report)
}

/// Count rows the CSV layer already rejected, and surface truncated rows
fn seed_row_issues(table: &RawTable, report: &mut ImportReport) {
    for (line, message) in &table.bad_rows {
        report.rows_seen += 1;
        report.error(*line, message.clone());
    }
    for line in &table.wide_rows {
        report.warn(*line, "row wider than header, extra cells ignored");
    }
}

// Staged-value appliers. Absent is a no-op (the prior value stays);
// any explicit value, including zero, overwrites.

fn apply_text(target: &mut String, value: &FieldValue) {
    if let FieldValue::Text(s) = value {
        *target = s.clone();
    }
}

fn apply_int(target: &mut i64, value: &FieldValue) {
    if let FieldValue::Int(i) = value {
        *target = *i;
    }
}

fn apply_float(target: &mut f64, value: &FieldValue) {
    if let FieldValue::Float(f) = value {
        *target = *f;
    }
}

fn import_enemies(
    store: &mut BalanceStore,
    table: &RawTable,
    report: &mut ImportReport,
) -> Result<()> {
    let headers = HeaderMap::from_row(&table.columns);
    ENEMY_SCHEMA.validate(&headers)?;
    seed_row_issues(table, report);

    for row in &table.rows {
        report.rows_seen += 1;
        let values = match coerce_row(&ENEMY_SCHEMA, &headers, row, report) {
            Ok(values) => values,
            Err(message) => {
                report.error(row.line, message);
                continue;
            }
        };
        let id = match values.text(EnemyField::Id) {
            Some(id) => id.to_string(),
            None => {
                report.error(row.line, "enemy id is missing");
                continue;
            }
        };

        let created = !store.enemies.contains_key(&id);
        let enemy = store.enemy_mut(&id);
        apply_text(&mut enemy.name, values.get(EnemyField::Name));
        apply_text(&mut enemy.description, values.get(EnemyField::Description));
        apply_float(&mut enemy.base_max_health, values.get(EnemyField::MaxHealth));
        apply_float(&mut enemy.base_move_speed, values.get(EnemyField::MoveSpeed));
        apply_float(&mut enemy.base_damage, values.get(EnemyField::Damage));
        apply_int(&mut enemy.xp_value, values.get(EnemyField::Xp));
        apply_int(&mut enemy.coin_drop_min, values.get(EnemyField::CoinMin));
        apply_int(&mut enemy.coin_drop_max, values.get(EnemyField::CoinMax));
        report.committed(created);
    }
    Ok(())
}

fn import_characters(
    store: &mut BalanceStore,
    table: &RawTable,
    report: &mut ImportReport,
) -> Result<()> {
    let headers = HeaderMap::from_row(&table.columns);
    CHARACTER_SCHEMA.validate(&headers)?;
    seed_row_issues(table, report);

    for row in &table.rows {
        report.rows_seen += 1;
        let values = match coerce_row(&CHARACTER_SCHEMA, &headers, row, report) {
            Ok(values) => values,
            Err(message) => {
                report.error(row.line, message);
                continue;
            }
        };
        let asset_name = match values.text(CharacterField::AssetName) {
            Some(name) => name.to_string(),
            None => {
                report.error(row.line, "character asset name is missing");
                continue;
            }
        };

        let created = !store.characters.contains_key(&asset_name);
        let character = store.character_mut(&asset_name);
        apply_float(&mut character.base_max_health, values.get(CharacterField::MaxHealth));
        apply_float(&mut character.base_move_speed, values.get(CharacterField::MoveSpeed));
        apply_float(&mut character.base_damage, values.get(CharacterField::Damage));
        apply_float(&mut character.attack_interval, values.get(CharacterField::AttackInterval));
        apply_float(&mut character.pickup_radius, values.get(CharacterField::PickupRadius));
        report.committed(created);
    }
    Ok(())
}

fn import_weapons(
    store: &mut BalanceStore,
    table: &RawTable,
    report: &mut ImportReport,
) -> Result<()> {
    let headers = HeaderMap::from_row(&table.columns);
    WEAPON_SCHEMA.validate(&headers)?;
    seed_row_issues(table, report);

    // next_level may point at a weapon defined further down the file, so
    // references are resolved in a second pass after every row committed
    let mut pending_refs: Vec<(usize, String, String)> = Vec::new();

    for row in &table.rows {
        report.rows_seen += 1;
        let values = match coerce_row(&WEAPON_SCHEMA, &headers, row, report) {
            Ok(values) => values,
            Err(message) => {
                report.error(row.line, message);
                continue;
            }
        };
        let asset_name = match values.text(WeaponField::AssetName) {
            Some(name) => name.to_string(),
            None => {
                report.error(row.line, "weapon asset name is missing");
                continue;
            }
        };

        let created = !store.weapons.contains_key(&asset_name);
        let weapon = store.weapon_mut(&asset_name);
        apply_int(&mut weapon.weapon_id, values.get(WeaponField::WeaponId));
        apply_float(&mut weapon.damage, values.get(WeaponField::Damage));
        apply_float(&mut weapon.cooldown, values.get(WeaponField::Cooldown));
        apply_int(&mut weapon.projectile_count, values.get(WeaponField::ProjectileCount));
        apply_float(&mut weapon.projectile_speed, values.get(WeaponField::ProjectileSpeed));
        apply_float(&mut weapon.duration, values.get(WeaponField::Duration));
        apply_float(&mut weapon.area, values.get(WeaponField::Area));

        if let Some(kind_cell) = values.text(WeaponField::Kind) {
            match WeaponKind::parse(kind_cell) {
                Some(kind) => weapon.kind = kind,
                None => report.warn(
                    row.line,
                    format!("unknown weapon type '{}', keeping prior value", kind_cell),
                ),
            }
        }

        if let Some(target) = values.text(WeaponField::NextLevel) {
            pending_refs.push((row.line, asset_name.clone(), target.to_string()));
        }
        report.committed(created);
    }

    for (line, asset_name, target) in pending_refs {
        let resolved = store.has_weapon(&target);
        if !resolved {
            tracing::warn!(line, weapon = %asset_name, target = %target, "unresolved weapon reference");
            report.warn(
                line,
                format!("weapon '{}' not found for '{}', reference left empty", target, asset_name),
            );
        }
        if let Some(weapon) = store.weapons.get_mut(&asset_name) {
            weapon.next_level = if resolved { Some(target) } else { None };
        }
    }
    Ok(())
}

fn import_levels(
    store: &mut BalanceStore,
    table: &RawTable,
    report: &mut ImportReport,
) -> Result<()> {
    let headers = HeaderMap::from_row(&table.columns);
    LEVEL_SCHEMA.validate(&headers)?;
    seed_row_issues(table, report);

    for row in &table.rows {
        report.rows_seen += 1;
        let values = match coerce_row(&LEVEL_SCHEMA, &headers, row, report) {
            Ok(values) => values,
            Err(message) => {
                report.error(row.line, message);
                continue;
            }
        };
        let number = match values
            .int(LevelField::Number)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
        {
            Some(number) => number,
            None => {
                report.error(row.line, "level number must be a positive integer");
                continue;
            }
        };

        // Parse and resolve the spawn mix before touching the record
        let spawn_mix = match values.text(LevelField::SpawnMix) {
            Some(cell) => match parse_spawn_mix(cell) {
                Ok(entries) => Some(resolve_spawn_mix(store, entries, row.line, report)),
                Err(message) => {
                    report.warn(
                        row.line,
                        format!("spawn mix: {}, keeping prior value", message),
                    );
                    None
                }
            },
            None => None,
        };

        let created = !store.levels.contains_key(&number);
        let level = store.level_mut(number);
        apply_float(&mut level.duration, values.get(LevelField::Duration));
        apply_float(&mut level.spawn_interval, values.get(LevelField::SpawnInterval));
        apply_float(&mut level.difficulty, values.get(LevelField::Difficulty));
        if let Some(mix) = spawn_mix {
            level.spawn_mix = mix;
        }
        for (slot, field) in LevelField::CARD_WEIGHTS.iter().enumerate() {
            apply_float(&mut level.card_level_weights[slot], values.get(*field));
        }
        report.committed(created);
    }
    Ok(())
}

/// One pre-resolution spawn entry as written in the packed cell
struct RawSpawnEntry {
    enemy: String,
    weight: f64,
    max_alive: i64,
    time_window: f64,
}

/// Packed spawn cell: entries separated by `|`, fields by `:`,
/// `enemy:weight:maxAlive:timeWindow`
fn parse_spawn_mix(cell: &str) -> std::result::Result<Vec<RawSpawnEntry>, String> {
    let mut entries = Vec::new();
    for part in cell.split('|') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let fields: Vec<&str> = part.split(':').collect();
        if fields.len() != 4 {
            return Err(format!(
                "expected enemy:weight:maxAlive:timeWindow, got '{}'",
                part
            ));
        }
        let weight = fields[1]
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", fields[1].trim()))?;
        let max_alive = fields[2]
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not an integer", fields[2].trim()))?;
        let time_window = fields[3]
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", fields[3].trim()))?;
        entries.push(RawSpawnEntry {
            enemy: fields[0].trim().to_string(),
            weight,
            max_alive,
            time_window,
        });
    }
    Ok(entries)
}

fn resolve_spawn_mix(
    store: &BalanceStore,
    raw: Vec<RawSpawnEntry>,
    line: usize,
    report: &mut ImportReport,
) -> Vec<SpawnEntry> {
    raw.into_iter()
        .map(|entry| {
            let enemy = if entry.enemy.is_empty() {
                None
            } else if store.has_enemy(&entry.enemy) {
                Some(entry.enemy)
            } else {
                tracing::warn!(line, enemy = %entry.enemy, "unresolved enemy reference");
                report.warn(
                    line,
                    format!("enemy '{}' not found, reference left empty", entry.enemy),
                );
                None
            };
            SpawnEntry {
                enemy,
                weight: entry.weight,
                max_alive: entry.max_alive,
                time_window: entry.time_window,
            }
        })
        .collect()
}

fn import_cards(
    store: &mut BalanceStore,
    table: &RawTable,
    report: &mut ImportReport,
) -> Result<()> {
    let headers = HeaderMap::from_row(&table.columns);
    CARD_SCHEMA.validate(&headers)?;
    seed_row_issues(table, report);

    for row in &table.rows {
        report.rows_seen += 1;
        let values = match coerce_row(&CARD_SCHEMA, &headers, row, report) {
            Ok(values) => values,
            Err(message) => {
                report.error(row.line, message);
                continue;
            }
        };
        let card_type_id = match values
            .int(CardField::CardId)
            .and_then(|n| u32::try_from(n).ok())
        {
            Some(id) => id,
            None => {
                report.error(row.line, "card id must be a non-negative integer");
                continue;
            }
        };
        let level = match values.int(CardField::Level) {
            Some(level) => level,
            None => {
                report.error(row.line, "card level is missing");
                continue;
            }
        };

        let created = !store.cards.contains_key(&card_type_id);
        let card = store.card_mut(card_type_id);
        apply_text(&mut card.name, values.get(CardField::Name));
        apply_text(&mut card.description, values.get(CardField::Description));

        // One row per level: write only this row's slot, the other four
        // keep whatever prior imports left there
        let slot_index = (level.clamp(1, CARD_LEVEL_SLOTS as i64) - 1) as usize;
        let slot = &mut card.level_bonuses[slot_index];
        slot.level = (slot_index + 1) as u32;
        apply_float(&mut slot.damage_bonus, values.get(CardField::Damage));
        apply_float(&mut slot.max_health_bonus, values.get(CardField::MaxHealth));
        apply_float(&mut slot.move_speed_bonus, values.get(CardField::MoveSpeed));
        apply_float(&mut slot.attack_speed_bonus, values.get(CardField::AttackSpeed));
        apply_float(&mut slot.crit_chance_bonus, values.get(CardField::CritChance));
        apply_float(&mut slot.cooldown_reduction, values.get(CardField::CooldownReduction));
        apply_float(&mut slot.pickup_radius_bonus, values.get(CardField::PickupRadius));
        report.committed(created);
    }
    Ok(())
}
