use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::pipeline::table::Table;

/// Concatenate tables, keeping every column in first-seen order.
/// Cells for columns a table lacks are left blank; rows are not deduplicated.
pub fn merge_tables(tables: &[Table]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in tables {
        for header in &table.headers {
            if !positions.contains_key(header) {
                positions.insert(header.clone(), headers.len());
                headers.push(header.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(tables.iter().map(|t| t.rows.len()).sum());
    for table in tables {
        let targets: Vec<usize> = table.headers.iter().map(|h| positions[h]).collect();
        for row in &table.rows {
            let mut merged = vec![String::new(); headers.len()];
            for (cell, &target) in row.iter().zip(&targets) {
                merged[target] = cell.clone();
            }
            rows.push(merged);
        }
    }

    Table::new(headers, rows)
}

/// Merge CSV files into `output`, returning the merged row count
pub fn merge_files(inputs: &[PathBuf], output: &Path) -> Result<usize> {
    let tables = inputs
        .iter()
        .map(Table::read_csv)
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_tables(&tables);
    merged.write_csv(output)?;
    info!(
        files = inputs.len(),
        rows = merged.rows.len(),
        columns = merged.headers.len(),
        output = %output.display(),
        "merged normalized files"
    );
    Ok(merged.rows.len())
}
