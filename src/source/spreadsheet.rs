//! Workbook reading via calamine.

use calamine::{Data, DataType, Reader, open_workbook_auto};
use std::path::Path;

use super::header_columns;
use crate::models::{CellValue, Record, RecordTable};
use crate::{Error, Result};

/// Read the first worksheet of a workbook. The first row is the header.
pub fn read_workbook(path: &Path) -> Result<RecordTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Other("workbook has no worksheets".to_string()))??;

    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(cells) => header_columns(cells.iter().map(|cell| cell.to_string())),
        None => return Ok(RecordTable::default()),
    };
    let columns: Vec<String> = header.iter().map(|(_, name)| name.clone()).collect();

    let mut rows = Vec::new();
    for cells in rows_iter {
        if cells.iter().all(|c| cell_value(c).is_empty()) {
            continue;
        }
        let mut record = Record::new();
        for (i, name) in &header {
            let value = cells.get(*i).map(cell_value).unwrap_or_default();
            record.insert(name.clone(), value);
        }
        rows.push(record);
    }

    Ok(RecordTable::new(columns, rows))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_datetime().map(CellValue::Date).unwrap_or_default()
        }
        Data::DurationIso(s) => CellValue::from_text(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use tempfile::TempDir;

    /// Workbook with a header, one full row, a blank row and a short row,
    /// plus a second sheet that must be ignored.
    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = workbook.add_worksheet();
        for (col, name) in ["DATE ADDED", "ASSET TAG", "Status", "Percent Complete"]
            .into_iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        let added = ExcelDateTime::from_ymd(2024, 5, 20).unwrap();
        sheet.write_datetime_with_format(1, 0, &added, &date_format).unwrap();
        sheet.write_string(1, 1, "W-1").unwrap();
        sheet.write_string(1, 2, "Complete").unwrap();
        sheet.write_number(1, 3, 100.0).unwrap();
        sheet.write_string(3, 1, "W-2").unwrap();

        let other = workbook.add_worksheet();
        other.write_string(0, 0, "Unrelated").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_workbook_first_sheet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.xlsx");
        write_fixture(&path);

        let table = read_workbook(&path).unwrap();
        assert_eq!(
            table.columns,
            vec!["DATE ADDED", "ASSET TAG", "Status", "Percent Complete"]
        );
        // The blank row is skipped.
        assert_eq!(table.len(), 2);

        let added = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(table.rows[0].get("Date Added"), Some(&CellValue::Date(added)));
        assert_eq!(table.rows[0].get("Percent Complete"), Some(&CellValue::Number(100.0)));
        assert_eq!(table.rows[0].text("asset tag"), Some("W-1".to_string()));
    }

    #[test]
    fn test_read_workbook_pads_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.xlsx");
        write_fixture(&path);

        let table = read_workbook(&path).unwrap();
        let short = &table.rows[1];
        assert_eq!(short.text("ASSET TAG"), Some("W-2".to_string()));
        assert!(short.has_field("Status"));
        assert!(short.get("Status").is_none());
        assert!(short.get("DATE ADDED").is_none());
    }

    #[test]
    fn test_workbook_dates_feed_derivation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.xlsx");
        write_fixture(&path);

        let outcome = crate::source::load(&path, crate::test_utils::fixed_now()).unwrap();
        assert!(!outcome.is_fallback());
        let enriched = crate::derive::derive_table(outcome.table(), crate::test_utils::fixed_now());
        assert_eq!(enriched.rows[0].derived.days_since_added, Some(26));
        assert!(enriched.rows[0].derived.is_complete);
        assert_eq!(enriched.rows[1].derived.date_added, None);
    }

    #[test]
    fn test_cell_value_conversion() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_value(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(cell_value(&Data::String(" High ".into())), CellValue::Text("High".into()));
        assert_eq!(cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_iso_datetime_cell() {
        let cell = Data::DateTimeIso("2024-03-04T08:30:00".into());
        match cell_value(&cell) {
            CellValue::Date(dt) => assert_eq!(dt.to_string(), "2024-03-04 08:30:00"),
            other => panic!("expected a date, got {other:?}"),
        }
    }
}
