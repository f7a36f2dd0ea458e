//! CSV reading and export.

use std::path::Path;

use super::header_columns;
use crate::Result;
use crate::models::{CellValue, Record, RecordTable};

/// Read a CSV file with a header row.
///
/// Short rows are padded with empty cells; extra cells beyond the header are
/// dropped.
pub fn read_csv(path: &Path) -> Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header = header_columns(reader.headers()?.iter());
    let columns: Vec<String> = header.iter().map(|(_, name)| name.clone()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut record = Record::new();
        for (i, name) in &header {
            let value = row.get(*i).map(CellValue::from_text).unwrap_or_default();
            record.insert(name.clone(), value);
        }
        rows.push(record);
    }

    Ok(RecordTable::new(columns, rows))
}

/// Write a table as CSV, one column per header entry.
pub fn write_csv(table: &RecordTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        let cells: Vec<String> = table
            .columns
            .iter()
            .map(|c| row.get(c).map(CellValue::display).unwrap_or_default())
            .collect();
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}
