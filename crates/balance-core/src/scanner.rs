//! Discovery of balance table files under a directory
//!
//! A file named `<kind>.csv` (case-insensitive stem) anywhere below the
//! root is treated as that table. Results come back in import dependency
//! order so one sync pass resolves cross-table references.

use crate::error::Result;
use crate::schema::TableKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Referenced tables import before the tables that reference them
pub const IMPORT_ORDER: [TableKind; 5] = [
    TableKind::Enemies,
    TableKind::Characters,
    TableKind::Weapons,
    TableKind::Cards,
    TableKind::Levels,
];

/// One discovered table file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    pub kind: TableKind,
    pub path: PathBuf,
}

/// Result of scanning a directory tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub root: PathBuf,
    /// Discovered tables in import dependency order
    pub tables: Vec<TableFile>,
    /// CSV files whose stem names no known table
    pub skipped: usize,
}

impl ScanResult {
    /// Find the first discovered file for a table
    pub fn find(&self, kind: TableKind) -> Option<&TableFile> {
        self.tables.iter().find(|t| t.kind == kind)
    }
}

/// Scan a directory tree for balance table CSV files
pub fn scan_directory<P: AsRef<Path>>(root: P) -> Result<ScanResult> {
    let root = root.as_ref();
    let mut tables = Vec::new();
    let mut skipped = 0;

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if !path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            continue;
        }

        match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(TableKind::parse)
        {
            Some(kind) => tables.push(TableFile {
                kind,
                path: path.to_path_buf(),
            }),
            None => skipped += 1,
        }
    }

    tables.sort_by(|a, b| {
        import_rank(a.kind)
            .cmp(&import_rank(b.kind))
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(ScanResult {
        root: root.to_path_buf(),
        tables,
        skipped,
    })
}

fn import_rank(kind: TableKind) -> usize {
    IMPORT_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(IMPORT_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_finds_and_orders_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("levels.csv"), "关卡\n1\n").unwrap();
        fs::write(dir.path().join("Enemies.csv"), "Id,名称\n").unwrap();
        fs::write(dir.path().join("notes.csv"), "a,b\n").unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        let result = scan_directory(dir.path()).unwrap();

        assert_eq!(result.tables.len(), 2);
        assert_eq!(result.tables[0].kind, TableKind::Enemies);
        assert_eq!(result.tables[1].kind, TableKind::Levels);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_scan_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("tables");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("cards.csv"), "卡牌ID,等级\n").unwrap();

        let result = scan_directory(dir.path()).unwrap();
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.find(TableKind::Cards).unwrap().kind, TableKind::Cards);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_directory(dir.path()).unwrap();
        assert!(result.tables.is_empty());
        assert_eq!(result.skipped, 0);
    }
}
