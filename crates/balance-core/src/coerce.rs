//! Cell coercion from raw strings to typed field values
//!
//! One generic loop handles every table: each [`ColumnSpec`] declares the
//! target type, so there are no per-field branches repeated per table.
//! Required-field failures skip the row; optional-field failures are
//! warnings and the value stays absent.

use crate::report::ImportReport;
use crate::schema::{ColumnSpec, FieldKind, HeaderMap, TableSchema};
use crate::table::RawRow;

/// A coerced cell. `Absent` means the cell was blank, its column is not
/// in this file, or an optional cell failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Absent,
}

static ABSENT: FieldValue = FieldValue::Absent;

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

/// Parse one trimmed, non-empty cell according to its declared kind.
/// `str::parse` always uses the invariant period-decimal format, so host
/// locale never affects numeric parsing.
fn parse_cell(cell: &str, kind: FieldKind) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(cell.to_string())),
        FieldKind::Int => cell
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| format!("'{}' is not an integer", cell)),
        FieldKind::Float => cell
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| format!("'{}' is not a number", cell)),
    }
}

/// Values coerced from one row, addressable by canonical field
#[derive(Debug)]
pub struct RowValues<F> {
    values: Vec<(F, FieldValue)>,
}

impl<F: Copy + PartialEq> RowValues<F> {
    pub fn get(&self, field: F) -> &FieldValue {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    pub fn text(&self, field: F) -> Option<&str> {
        match self.get(field) {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, field: F) -> Option<i64> {
        match self.get(field) {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn float(&self, field: F) -> Option<f64> {
        match self.get(field) {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Coerce one row against its schema.
///
/// Returns `Err(message)` when a required field is blank or unparsable;
/// the caller skips the row and counts it as failed. Optional-field
/// failures become warnings on `report` and coerce to `Absent`, so a
/// blank or broken optional cell leaves the prior record value alone.
pub fn coerce_row<F: Copy + PartialEq + 'static>(
    schema: &TableSchema<F>,
    headers: &HeaderMap,
    row: &RawRow,
    report: &mut ImportReport,
) -> Result<RowValues<F>, String> {
    let mut values = Vec::with_capacity(schema.columns.len());
    for col in schema.columns {
        let value = coerce_field(col, headers, row, report)?;
        values.push((col.field, value));
    }
    Ok(RowValues { values })
}

fn coerce_field<F: Copy>(
    col: &ColumnSpec<F>,
    headers: &HeaderMap,
    row: &RawRow,
    report: &mut ImportReport,
) -> Result<FieldValue, String> {
    let index = match headers.get(col.header) {
        Some(index) => index,
        // validate() already guaranteed required columns are present
        None => return Ok(FieldValue::Absent),
    };

    let cell = row.get(index).trim();
    if cell.is_empty() {
        if col.required {
            return Err(format!("required column '{}' is blank", col.header));
        }
        return Ok(FieldValue::Absent);
    }

    match parse_cell(cell, col.kind) {
        Ok(value) => Ok(value),
        Err(message) if col.required => {
            Err(format!("required column '{}': {}", col.header, message))
        }
        Err(message) => {
            report.warn(
                row.line,
                format!("column '{}': {}, keeping prior value", col.header, message),
            );
            Ok(FieldValue::Absent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestField {
        Key,
        Count,
        Ratio,
    }

    static TEST_SCHEMA: TableSchema<TestField> = TableSchema {
        kind: TableKind::Enemies,
        columns: &[
            ColumnSpec { header: "Key", field: TestField::Key, kind: FieldKind::Text, required: true },
            ColumnSpec { header: "Count", field: TestField::Count, kind: FieldKind::Int, required: false },
            ColumnSpec { header: "Ratio", field: TestField::Ratio, kind: FieldKind::Float, required: false },
        ],
    };

    fn fixture(cells: &[&str]) -> (HeaderMap, RawRow) {
        let headers = HeaderMap::from_row(&[
            "Key".to_string(),
            "Count".to_string(),
            "Ratio".to_string(),
        ]);
        let row = RawRow {
            line: 2,
            fields: cells.iter().map(|s| s.to_string()).collect(),
        };
        (headers, row)
    }

    #[test]
    fn test_coerce_typed_values() {
        let (headers, row) = fixture(&["boss", "3", "1.5"]);
        let mut report = ImportReport::new(TableKind::Enemies, "test");
        let values = coerce_row(&TEST_SCHEMA, &headers, &row, &mut report).unwrap();

        assert_eq!(values.text(TestField::Key), Some("boss"));
        assert_eq!(values.int(TestField::Count), Some(3));
        assert_eq!(values.float(TestField::Ratio), Some(1.5));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_blank_optional_cell_is_absent() {
        let (headers, row) = fixture(&["boss", "", "  "]);
        let mut report = ImportReport::new(TableKind::Enemies, "test");
        let values = coerce_row(&TEST_SCHEMA, &headers, &row, &mut report).unwrap();

        assert!(values.get(TestField::Count).is_absent());
        assert!(values.get(TestField::Ratio).is_absent());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_blank_required_cell_fails_row() {
        let (headers, row) = fixture(&["", "3", "1.5"]);
        let mut report = ImportReport::new(TableKind::Enemies, "test");
        let err = coerce_row(&TEST_SCHEMA, &headers, &row, &mut report).unwrap_err();
        assert!(err.contains("Key"));
    }

    #[test]
    fn test_unparsable_required_cell_fails_row() {
        let headers = HeaderMap::from_row(&["Key".to_string(), "Count".to_string()]);
        static INT_KEY_SCHEMA: TableSchema<TestField> = TableSchema {
            kind: TableKind::Cards,
            columns: &[
                ColumnSpec { header: "Key", field: TestField::Key, kind: FieldKind::Int, required: true },
            ],
        };
        let row = RawRow {
            line: 2,
            fields: vec!["abc".to_string(), "1".to_string()],
        };
        let mut report = ImportReport::new(TableKind::Cards, "test");
        assert!(coerce_row(&INT_KEY_SCHEMA, &headers, &row, &mut report).is_err());
    }

    #[test]
    fn test_unparsable_optional_cell_warns_and_commits() {
        let (headers, row) = fixture(&["boss", "many", "1.5"]);
        let mut report = ImportReport::new(TableKind::Enemies, "test");
        let values = coerce_row(&TEST_SCHEMA, &headers, &row, &mut report).unwrap();

        assert!(values.get(TestField::Count).is_absent());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 2);
    }

    #[test]
    fn test_missing_optional_column_is_absent() {
        let headers = HeaderMap::from_row(&["Key".to_string()]);
        let row = RawRow {
            line: 2,
            fields: vec!["boss".to_string()],
        };
        let mut report = ImportReport::new(TableKind::Enemies, "test");
        let values = coerce_row(&TEST_SCHEMA, &headers, &row, &mut report).unwrap();
        assert!(values.get(TestField::Count).is_absent());
    }

    #[test]
    fn test_numeric_parsing_uses_period_separator() {
        assert_eq!(
            parse_cell("2.5", FieldKind::Float),
            Ok(FieldValue::Float(2.5))
        );
        assert!(parse_cell("2,5", FieldKind::Float).is_err());
    }
}
