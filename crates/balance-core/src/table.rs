//! Raw table types produced by the CSV parser
//!
//! Cells stay untyped strings at this stage; the schema layer decides
//! what each column means per table.

/// A parsed table: one header row plus ordered data rows of string fields
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Where the table came from (path or label), used in messages
    pub source_name: String,
    /// Header cells in file order
    pub columns: Vec<String>,
    /// Data rows that parsed cleanly
    pub rows: Vec<RawRow>,
    /// Rows the CSV layer could not parse: (line, message)
    pub bad_rows: Vec<(usize, String)>,
    /// Lines of rows that were wider than the header and got truncated
    pub wide_rows: Vec<usize>,
}

impl RawTable {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of cleanly parsed data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A row of string fields
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based file line number, as a spreadsheet shows it (header is line 1)
    pub line: usize,
    /// Cell values, padded to the header width
    pub fields: Vec<String>,
}

impl RawRow {
    /// Get a cell by column index, empty string when out of range
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_get_out_of_range() {
        let row = RawRow {
            line: 2,
            fields: vec!["a".to_string()],
        };
        assert_eq!(row.get(0), "a");
        assert_eq!(row.get(5), "");
    }
}
