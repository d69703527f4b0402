//! CSV parser for balance table files
//!
//! Produces rows of untyped string fields. Quoting follows RFC4180:
//! delimiters and newlines are allowed inside double quotes, and a
//! doubled quote is a literal quote. Blank lines yield no row. Row
//! numbers are 1-based file line numbers (the header is line 1), which
//! is what a designer sees in a spreadsheet.

use crate::error::{Error, Result};
use crate::table::{RawRow, RawTable};
use std::fs;
use std::path::Path;

/// Parse a table file. The whole file is read into memory up front;
/// balance tables are small.
pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_str(&content, &path.display().to_string())
}

/// Parse CSV text into a raw table. A UTF-8 byte-order mark is
/// tolerated. Rows that fail to parse are recorded in `bad_rows` with
/// their line numbers instead of aborting the table.
pub fn parse_str(content: &str, source_name: &str) -> Result<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // column presence is the schema layer's concern
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| Error::Csv {
        source_name: source_name.to_string(),
        source: e,
    })?;
    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(Error::EmptyTable {
            source_name: source_name.to_string(),
        });
    }

    let mut rows = Vec::new();
    let mut bad_rows = Vec::new();
    let mut wide_rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        // Fallback when the reader lost track of the position: header is
        // line 1, first record line 2
        let fallback_line = index + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);

                let mut fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
                if fields.len() > columns.len() {
                    wide_rows.push(line);
                    fields.truncate(columns.len());
                }
                while fields.len() < columns.len() {
                    fields.push(String::new());
                }

                rows.push(RawRow { line, fields });
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                bad_rows.push((line, format!("malformed row: {}", e)));
            }
        }
    }

    Ok(RawTable {
        source_name: source_name.to_string(),
        columns,
        rows,
        bad_rows,
        wide_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let csv = "Id,名称,经验值\nEnemy01,基础怪,1\nEnemy02,快速怪,2\n";
        let table = parse_str(csv, "enemies.csv").unwrap();

        assert_eq!(table.columns, vec!["Id", "名称", "经验值"]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].get(0), "Enemy01");
        assert_eq!(table.rows[1].get(1), "快速怪");
        assert!(table.bad_rows.is_empty());
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let csv = "\u{feff}Id,名称\nEnemy01,基础怪\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.columns[0], "Id");
    }

    #[test]
    fn test_quoted_delimiter_and_newline() {
        let csv = "Id,描述\nEnemy01,\"有逗号, 和\n换行\"\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].get(1), "有逗号, 和\n换行");
    }

    #[test]
    fn test_doubled_quote_is_literal() {
        let csv = "Id,描述\nEnemy01,\"别名 \"\"BOSS\"\"\"\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.rows[0].get(1), "别名 \"BOSS\"");
    }

    #[test]
    fn test_blank_lines_produce_no_rows() {
        let csv = "Id,名称\n\nEnemy01,基础怪\n\n\nEnemy02,快速怪\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Id,名称,描述\nEnemy01,基础怪\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.rows[0].fields.len(), 3);
        assert_eq!(table.rows[0].get(2), "");
    }

    #[test]
    fn test_wide_rows_are_truncated_and_flagged() {
        let csv = "Id,名称\nEnemy01,基础怪,多余的\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.rows[0].fields.len(), 2);
        assert_eq!(table.wide_rows, vec![2]);
    }

    #[test]
    fn test_crlf_row_separators() {
        let csv = "Id,名称\r\nEnemy01,基础怪\r\nEnemy02,快速怪\r\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_input_is_fatal() {
        assert!(matches!(
            parse_str("", "empty.csv"),
            Err(Error::EmptyTable { .. })
        ));
    }

    #[test]
    fn test_row_numbers_are_file_lines() {
        let csv = "Id,名称\n\nEnemy01,基础怪\nEnemy02,快速怪\n";
        let table = parse_str(csv, "enemies.csv").unwrap();
        // blank line 2 is skipped, data starts at line 3
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[1].line, 4);
    }
}
