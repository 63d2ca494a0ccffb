use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::Result;

/// A string-typed table as read from one CSV file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// column names, from the header row
    pub headers: Vec<String>,
    /// each data row, padded to the header width
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self { headers, rows };
        table.pad_rows();
        table
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// All cells of one column, blank where a row is short
    pub fn column(&self, idx: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect()
    }

    fn pad_rows(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(headers, rows))
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(File::create(path)?);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![vec!["1".to_string()]],
        );
        assert_eq!(table.rows[0], vec!["1".to_string(), String::new(), String::new()]);
        assert_eq!(table.column(2), vec![String::new()]);
    }

    #[test]
    fn test_csv_round_trip_keeps_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let table = Table::new(
            vec!["Room".to_string(), "Price".to_string()],
            vec![
                vec!["Už grotų".to_string(), "100, EUR".to_string()],
                vec!["Alkatrasas".to_string(), String::new()],
            ],
        );
        table.write_csv(&path).unwrap();
        assert_eq!(Table::read_csv(&path).unwrap(), table);
    }
}
