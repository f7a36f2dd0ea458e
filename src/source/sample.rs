//! Built-in sample records used when the source file is absent.

use chrono::NaiveDateTime;

use crate::models::{CellValue, Record, RecordTable};

const COLUMNS: [&str; 9] = [
    "Status",
    "Priority",
    "Percent Complete",
    "Gallon Total",
    "Value 1",
    "DATE ADDED",
    "ASSET TAG",
    "LOCATION DESCRIPTION",
    "DECK LEVEL",
];

// (status, priority, percent, gallons, risk, tag, location, deck)
const ROWS: [(&str, &str, f64, f64, f64, &str, &str, &str); 5] = [
    ("Complete", "Low", 100.0, 10.0, 2.5, "A001", "Deck 1", "Level 1"),
    ("In Progress", "Medium", 50.0, 15.0, 7.8, "A002", "Deck 2", "Level 2"),
    ("Not Started", "High", 0.0, 0.0, 9.2, "A003", "Deck 3", "Level 3"),
    ("Complete", "Low", 100.0, 5.0, 1.1, "A004", "Deck 1", "Level 1"),
    ("High Priority", "High", 25.0, 20.0, 8.5, "A005", "Deck 2", "Level 2"),
];

/// Five fixed sample records, all added at `now`.
pub fn sample_table(now: NaiveDateTime) -> RecordTable {
    let rows = ROWS
        .iter()
        .map(|&(status, priority, percent, gallons, risk, tag, location, deck)| {
            let cells = [
                CellValue::from_text(status),
                CellValue::from_text(priority),
                CellValue::Number(percent),
                CellValue::Number(gallons),
                CellValue::Number(risk),
                CellValue::Date(now),
                CellValue::from_text(tag),
                CellValue::from_text(location),
                CellValue::from_text(deck),
            ];
            let mut record = Record::new();
            for (name, value) in COLUMNS.iter().zip(cells) {
                record.insert(*name, value);
            }
            record
        })
        .collect();

    RecordTable::new(COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
}
