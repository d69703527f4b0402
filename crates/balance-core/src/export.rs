//! Canonical CSV export, the inverse of the import path
//!
//! Column order is the schema declaration order, numbers use the same
//! invariant formatting the importer parses, and strings are quoted per
//! RFC4180. Export only reads the store it is given.

use crate::error::Result;
use crate::records::SpawnEntry;
use crate::schema::{TableKind, TableSchema, CARD_SCHEMA, CHARACTER_SCHEMA, ENEMY_SCHEMA, LEVEL_SCHEMA, WEAPON_SCHEMA};
use crate::store::BalanceStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Byte-order mark written first so spreadsheet tools pick UTF-8
const BOM: &str = "\u{feff}";

/// Export one table to a file. Returns the number of data rows written.
pub fn export_path<P: AsRef<Path>>(
    store: &BalanceStore,
    kind: TableKind,
    path: P,
) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let rows = export_table(store, kind, &mut writer)?;
    writer.flush()?;
    Ok(rows)
}

/// Export one table as CSV to any writer
pub fn export_table<W: Write>(store: &BalanceStore, kind: TableKind, writer: &mut W) -> Result<usize> {
    write!(writer, "{}", BOM)?;
    let rows = match kind {
        TableKind::Levels => export_levels(store, writer)?,
        TableKind::Enemies => export_enemies(store, writer)?,
        TableKind::Characters => export_characters(store, writer)?,
        TableKind::Weapons => export_weapons(store, writer)?,
        TableKind::Cards => export_cards(store, writer)?,
    };
    tracing::debug!(table = %kind, rows, "exported table");
    Ok(rows)
}

/// Export one table to an in-memory string (tests and previews)
pub fn export_string(store: &BalanceStore, kind: TableKind) -> Result<String> {
    let mut buffer = Vec::new();
    export_table(store, kind, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_header<W: Write, F: 'static>(writer: &mut W, schema: &TableSchema<F>) -> std::io::Result<()> {
    let header: Vec<&str> = schema.columns.iter().map(|c| c.header).collect();
    writeln!(writer, "{}", header.join(","))
}

fn write_row<W: Write>(writer: &mut W, cells: &[String]) -> std::io::Result<()> {
    let escaped: Vec<String> = cells.iter().map(|c| escape_csv(c)).collect();
    writeln!(writer, "{}", escaped.join(","))
}

/// Quote a value when it contains a delimiter, quote, or newline
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Invariant numeric formatting: shortest form that round-trips, period
/// decimal separator, no locale involvement
fn fmt_float(value: f64) -> String {
    value.to_string()
}

fn export_enemies<W: Write>(store: &BalanceStore, writer: &mut W) -> Result<usize> {
    write_header(writer, &ENEMY_SCHEMA)?;
    let mut rows = 0;
    for enemy in store.enemies.values() {
        let cells = vec![
            enemy.id.clone(),
            enemy.name.clone(),
            enemy.description.clone(),
            fmt_float(enemy.base_max_health),
            fmt_float(enemy.base_move_speed),
            fmt_float(enemy.base_damage),
            enemy.xp_value.to_string(),
            enemy.coin_drop_min.to_string(),
            enemy.coin_drop_max.to_string(),
        ];
        write_row(writer, &cells)?;
        rows += 1;
    }
    Ok(rows)
}

fn export_characters<W: Write>(store: &BalanceStore, writer: &mut W) -> Result<usize> {
    write_header(writer, &CHARACTER_SCHEMA)?;
    let mut rows = 0;
    for character in store.characters.values() {
        let cells = vec![
            character.asset_name.clone(),
            fmt_float(character.base_max_health),
            fmt_float(character.base_move_speed),
            fmt_float(character.base_damage),
            fmt_float(character.attack_interval),
            fmt_float(character.pickup_radius),
        ];
        write_row(writer, &cells)?;
        rows += 1;
    }
    Ok(rows)
}

fn export_weapons<W: Write>(store: &BalanceStore, writer: &mut W) -> Result<usize> {
    write_header(writer, &WEAPON_SCHEMA)?;
    let mut rows = 0;
    for weapon in store.weapons.values() {
        let cells = vec![
            weapon.asset_name.clone(),
            weapon.weapon_id.to_string(),
            weapon.kind.as_str().to_string(),
            fmt_float(weapon.damage),
            fmt_float(weapon.cooldown),
            weapon.projectile_count.to_string(),
            fmt_float(weapon.projectile_speed),
            fmt_float(weapon.duration),
            fmt_float(weapon.area),
            weapon.next_level.clone().unwrap_or_default(),
        ];
        write_row(writer, &cells)?;
        rows += 1;
    }
    Ok(rows)
}

fn export_levels<W: Write>(store: &BalanceStore, writer: &mut W) -> Result<usize> {
    write_header(writer, &LEVEL_SCHEMA)?;
    let mut rows = 0;
    for level in store.levels.values() {
        let mut cells = vec![
            level.level_number.to_string(),
            fmt_float(level.duration),
            fmt_float(level.spawn_interval),
            fmt_float(level.difficulty),
            pack_spawn_mix(&level.spawn_mix),
        ];
        for weight in level.card_level_weights {
            cells.push(fmt_float(weight));
        }
        write_row(writer, &cells)?;
        rows += 1;
    }
    Ok(rows)
}

/// Inverse of the importer's packed spawn cell
fn pack_spawn_mix(mix: &[SpawnEntry]) -> String {
    mix.iter()
        .map(|entry| {
            format!(
                "{}:{}:{}:{}",
                entry.enemy.as_deref().unwrap_or(""),
                fmt_float(entry.weight),
                entry.max_alive,
                fmt_float(entry.time_window)
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn export_cards<W: Write>(store: &BalanceStore, writer: &mut W) -> Result<usize> {
    write_header(writer, &CARD_SCHEMA)?;
    let mut rows = 0;
    for card in store.cards.values() {
        // one row per populated level slot, mirroring the import side
        for slot in &card.level_bonuses {
            if slot.level == 0 {
                continue;
            }
            let cells = vec![
                card.card_type_id.to_string(),
                slot.level.to_string(),
                card.name.clone(),
                card.description.clone(),
                fmt_float(slot.damage_bonus),
                fmt_float(slot.max_health_bonus),
                fmt_float(slot.move_speed_bonus),
                fmt_float(slot.attack_speed_bonus),
                fmt_float(slot.crit_chance_bonus),
                fmt_float(slot.cooldown_reduction),
                fmt_float(slot.pickup_radius_bonus),
            ];
            write_row(writer, &cells)?;
            rows += 1;
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_str;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_fmt_float_shortest_form() {
        assert_eq!(fmt_float(20.0), "20");
        assert_eq!(fmt_float(2.5), "2.5");
        assert_eq!(fmt_float(-0.05), "-0.05");
    }

    #[test]
    fn test_export_starts_with_bom_and_header() {
        let store = BalanceStore::new();
        let text = export_string(&store, TableKind::Enemies).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("Id,名称,描述"));
    }

    #[test]
    fn test_enemy_round_trip() {
        let csv = "Id,名称,描述,基础生命,基础移速,基础伤害,经验值,掉落金币最小,掉落金币最大\n\
Enemy01,基础怪,基础敌人,20,2,1,1,1,1\n\
Enemy02,\"快速怪, 小\",跑得快,10.5,4,1,2,1,3\n";
        let mut store = BalanceStore::new();
        import_str(&mut store, TableKind::Enemies, csv, "enemies.csv").unwrap();

        let exported = export_string(&store, TableKind::Enemies).unwrap();
        let mut reimported = BalanceStore::new();
        let report =
            import_str(&mut reimported, TableKind::Enemies, &exported, "round.csv").unwrap();

        assert!(!report.has_errors());
        assert_eq!(reimported, store);
    }

    #[test]
    fn test_level_round_trip_with_spawn_mix() {
        let mut store = BalanceStore::new();
        store.enemy_mut("Enemy01").name = "基础怪".to_string();
        let csv = "关卡,时长,刷怪间隔,难度系数,刷怪配置,卡牌1权重,卡牌2权重,卡牌3权重,卡牌4权重,卡牌5权重\n\
1,60,2.5,1,Enemy01:3:5:30,50,30,12,6,2\n";
        import_str(&mut store, TableKind::Levels, csv, "levels.csv").unwrap();

        let exported = export_string(&store, TableKind::Levels).unwrap();
        let mut reimported = BalanceStore::new();
        reimported.enemy_mut("Enemy01").name = "基础怪".to_string();
        import_str(&mut reimported, TableKind::Levels, &exported, "round.csv").unwrap();

        assert_eq!(reimported.levels, store.levels);
    }

    #[test]
    fn test_card_export_one_row_per_populated_slot() {
        let header = "卡牌ID,等级,名称,描述,伤害加成,生命加成,移速加成,攻速加成,暴击加成,冷却缩减,拾取范围加成";
        let csv = format!("{}\n7,1,火球,投掷火球,1,0,0,0,0,0,0\n7,3,火球,投掷火球,3,0,0,0,0,0,0\n", header);
        let mut store = BalanceStore::new();
        import_str(&mut store, TableKind::Cards, &csv, "cards.csv").unwrap();

        let exported = export_string(&store, TableKind::Cards).unwrap();
        let lines: Vec<&str> = exported.trim_start_matches('\u{feff}').lines().collect();
        // header plus the two populated slots, levels 2/4/5 never written
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("7,1,火球"));
        assert!(lines[2].starts_with("7,3,火球"));
    }

    #[test]
    fn test_card_round_trip() {
        let header = "卡牌ID,等级,名称,描述,伤害加成,生命加成,移速加成,攻速加成,暴击加成,冷却缩减,拾取范围加成";
        let csv = format!(
            "{}\n7,1,火球,投掷火球,1,0,0,0,0,0,0\n7,2,火球,投掷火球,2,0,0,0,0.05,0,0\n",
            header
        );
        let mut store = BalanceStore::new();
        import_str(&mut store, TableKind::Cards, &csv, "cards.csv").unwrap();

        let exported = export_string(&store, TableKind::Cards).unwrap();
        let mut reimported = BalanceStore::new();
        import_str(&mut reimported, TableKind::Cards, &exported, "round.csv").unwrap();

        assert_eq!(reimported, store);
    }

    #[test]
    fn test_weapon_round_trip() {
        let csv = "资源名,武器ID,类型,伤害,冷却,弹体数量,弹体速度,持续时间,范围,下一级\n\
Sword1,1,近战,5,1.2,1,0,0.5,1.5,Sword2\n\
Sword2,1,近战,9,1.1,1,0,0.5,1.8,\n";
        let mut store = BalanceStore::new();
        import_str(&mut store, TableKind::Weapons, csv, "weapons.csv").unwrap();

        let exported = export_string(&store, TableKind::Weapons).unwrap();
        let mut reimported = BalanceStore::new();
        import_str(&mut reimported, TableKind::Weapons, &exported, "round.csv").unwrap();

        assert_eq!(reimported, store);
    }
}
