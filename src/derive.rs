//! Derived-field computation.
//!
//! Every derived value is a pure function of the raw fields it reads and the
//! `now` passed in. Missing columns and malformed cells coerce to defaults;
//! derivation never fails and never drops rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::fields::{self, derived};
use crate::models::{CellValue, Priority, Record, RecordTable, Status};

/// Weight of the risk rating in the urgency score.
pub const URGENCY_RISK_WEIGHT: f64 = 0.3;
/// Weight of each day since the record was added.
pub const URGENCY_AGE_WEIGHT: f64 = 0.001;
/// Bonus for high (or critical) priority.
pub const URGENCY_PRIORITY_WEIGHT: f64 = 2.0;

/// Day-first formats tried after the ISO forms.
const DAY_FIRST_DATETIME_FORMATS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const DAY_FIRST_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const ISO_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Values computed per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedFields {
    pub percent_complete: f64,
    pub is_complete: bool,
    pub is_in_progress: bool,
    pub is_not_started: bool,
    /// High or Critical priority
    pub is_high_priority: bool,
    pub is_critical: bool,
    pub gallons: f64,
    pub risk_rating: f64,
    pub estimated_hours: f64,
    pub cost_estimate: f64,
    pub date_added: Option<NaiveDateTime>,
    pub days_since_added: Option<i64>,
    pub urgency_score: f64,
}

/// A raw record together with its derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: Record,
    pub derived: DerivedFields,
}

impl EnrichedRecord {
    pub fn status(&self) -> Option<Status> {
        self.record.text(fields::STATUS).map(|s| Status::parse(&s))
    }

    pub fn priority(&self) -> Option<Priority> {
        self.record.text(fields::PRIORITY).map(|s| Priority::parse(&s))
    }

    /// Cell to show for a column, preferring the normalized derived value
    /// for Percent Complete and Date Added.
    pub fn display_cell(&self, name: &str) -> CellValue {
        let key = crate::models::normalize_field_name(name);
        if key == crate::models::normalize_field_name(fields::PERCENT_COMPLETE) {
            return CellValue::Number(self.derived.percent_complete);
        }
        if key == crate::models::normalize_field_name(fields::DATE_ADDED) {
            return self
                .derived
                .date_added
                .map(CellValue::Date)
                .unwrap_or(CellValue::Empty);
        }
        self.record.get(name).cloned().unwrap_or_default()
    }
}

/// A table after derivation: same rows, same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichedTable {
    pub columns: Vec<String>,
    pub rows: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        let key = crate::models::normalize_field_name(name);
        self.columns
            .iter()
            .any(|c| crate::models::normalize_field_name(c) == key)
    }

    /// Keep the header, replace the rows.
    pub fn with_rows(&self, rows: Vec<EnrichedRecord>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Write the derived values back into plain records.
    ///
    /// Percent Complete and Date Added are replaced by their parsed values;
    /// the other derived fields are appended as new columns. Deriving the
    /// result again yields the same derived values.
    pub fn flatten(&self) -> RecordTable {
        let mut columns = self.columns.clone();
        for name in [fields::PERCENT_COMPLETE, fields::DATE_ADDED]
            .into_iter()
            .chain(DERIVED_COLUMNS)
        {
            push_column(&mut columns, name);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut record = row.record.clone();
                let d = &row.derived;
                record.insert(fields::PERCENT_COMPLETE, CellValue::Number(d.percent_complete));
                record.insert(
                    fields::DATE_ADDED,
                    d.date_added.map(CellValue::Date).unwrap_or_default(),
                );
                record.insert(derived::IS_COMPLETE, CellValue::Bool(d.is_complete));
                record.insert(derived::IS_IN_PROGRESS, CellValue::Bool(d.is_in_progress));
                record.insert(derived::IS_NOT_STARTED, CellValue::Bool(d.is_not_started));
                record.insert(derived::IS_HIGH_PRIORITY, CellValue::Bool(d.is_high_priority));
                record.insert(derived::IS_CRITICAL, CellValue::Bool(d.is_critical));
                record.insert(derived::GALLONS, CellValue::Number(d.gallons));
                record.insert(derived::RISK_RATING, CellValue::Number(d.risk_rating));
                record.insert(
                    derived::DAYS_SINCE_ADDED,
                    d.days_since_added
                        .map(|days| CellValue::Number(days as f64))
                        .unwrap_or_default(),
                );
                record.insert(derived::URGENCY_SCORE, CellValue::Number(d.urgency_score));
                record
            })
            .collect();

        RecordTable::new(columns, rows)
    }
}

const DERIVED_COLUMNS: [&str; 9] = [
    derived::IS_COMPLETE,
    derived::IS_IN_PROGRESS,
    derived::IS_NOT_STARTED,
    derived::IS_HIGH_PRIORITY,
    derived::IS_CRITICAL,
    derived::GALLONS,
    derived::RISK_RATING,
    derived::DAYS_SINCE_ADDED,
    derived::URGENCY_SCORE,
];

fn push_column(columns: &mut Vec<String>, name: &str) {
    let key = crate::models::normalize_field_name(name);
    if !columns
        .iter()
        .any(|c| crate::models::normalize_field_name(c) == key)
    {
        columns.push(name.to_string());
    }
}

/// Derive every row of a table.
pub fn derive_table(table: &RecordTable, now: NaiveDateTime) -> EnrichedTable {
    EnrichedTable {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .map(|record| EnrichedRecord {
                record: record.clone(),
                derived: derive_record(record, now),
            })
            .collect(),
    }
}

/// Compute the derived fields of a single record.
pub fn derive_record(record: &Record, now: NaiveDateTime) -> DerivedFields {
    let status = record.text(fields::STATUS).map(|s| Status::parse(&s));
    let priority = record.text(fields::PRIORITY).map(|s| Priority::parse(&s));

    let is_high_priority = priority.as_ref().is_some_and(Priority::is_high);
    let risk_rating = coerce_number(record.get(fields::VALUE_1));
    let date_added = record.get(fields::DATE_ADDED).and_then(parse_date);
    let days_since_added = date_added.map(|d| (now.date() - d.date()).num_days());

    DerivedFields {
        percent_complete: parse_percent(record.get(fields::PERCENT_COMPLETE)),
        is_complete: status == Some(Status::Complete),
        is_in_progress: status == Some(Status::InProgress),
        is_not_started: status == Some(Status::NotStarted),
        is_high_priority,
        is_critical: priority == Some(Priority::Critical),
        gallons: coerce_number(record.get(fields::GALLON_TOTAL)),
        risk_rating,
        estimated_hours: coerce_number(record.get(fields::ESTIMATED_HOURS)),
        cost_estimate: coerce_number(record.get(fields::COST_ESTIMATE)),
        date_added,
        days_since_added,
        urgency_score: urgency_score(risk_rating, days_since_added, is_high_priority),
    }
}

/// Display heuristic combining risk, age and priority.
///
/// A missing age contributes nothing.
pub fn urgency_score(risk_rating: f64, days_since_added: Option<i64>, high_priority: bool) -> f64 {
    let age = days_since_added.unwrap_or(0) as f64;
    let priority = if high_priority { 1.0 } else { 0.0 };
    URGENCY_RISK_WEIGHT * risk_rating + URGENCY_AGE_WEIGHT * age + URGENCY_PRIORITY_WEIGHT * priority
}

/// Parse a percentage cell: `75`, `"75%"`, `" 75 % "` all give 75.0.
pub fn parse_percent(cell: Option<&CellValue>) -> f64 {
    match cell {
        Some(CellValue::Number(n)) => finite_or_zero(*n),
        Some(CellValue::Text(s)) => {
            let cleaned = s.replace('%', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                0.0
            } else {
                cleaned.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Numeric coercion with a zero default.
///
/// Numeric strings parse, tolerating thousands separators and a leading `$`.
pub fn coerce_number(cell: Option<&CellValue>) -> f64 {
    match cell {
        Some(CellValue::Number(n)) => finite_or_zero(*n),
        Some(CellValue::Text(s)) => {
            let trimmed = s.trim();
            let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
            unsigned
                .replace(',', "")
                .trim()
                .parse::<f64>()
                .map(finite_or_zero)
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() { n } else { 0.0 }
}

/// Parse a date-like cell. Unparsable values give `None`.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parse a date string: ISO forms first, then day-first forms.
pub fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in ISO_DATETIME_FORMATS.iter().chain(DAY_FIRST_DATETIME_FORMATS.iter()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in DAY_FIRST_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_now, record};

    #[test]
    fn test_empty_record_derives_defaults() {
        let derived = derive_record(&Record::new(), fixed_now());
        assert_eq!(derived.percent_complete, 0.0);
        assert!(!derived.is_complete);
        assert!(!derived.is_in_progress);
        assert!(!derived.is_not_started);
        assert!(!derived.is_high_priority);
        assert!(!derived.is_critical);
        assert_eq!(derived.gallons, 0.0);
        assert_eq!(derived.risk_rating, 0.0);
        assert_eq!(derived.date_added, None);
        assert_eq!(derived.days_since_added, None);
        assert_eq!(derived.urgency_score, 0.0);
    }

    #[test]
    fn test_percent_complete_parsing() {
        let text = |s: &str| CellValue::from_text(s);
        assert_eq!(parse_percent(Some(&text("75%"))), 75.0);
        assert_eq!(parse_percent(Some(&text(" 12.5 % "))), 12.5);
        assert_eq!(parse_percent(Some(&CellValue::Number(50.0))), 50.0);
        assert_eq!(parse_percent(Some(&text("%"))), 0.0);
        assert_eq!(parse_percent(Some(&text("about half"))), 0.0);
        assert_eq!(parse_percent(Some(&CellValue::Empty)), 0.0);
        assert_eq!(parse_percent(None), 0.0);
    }

    #[test]
    fn test_percent_complete_blank_string() {
        let r = record(&[("Percent Complete", "")]);
        assert_eq!(derive_record(&r, fixed_now()).percent_complete, 0.0);
    }

    #[test]
    fn test_priority_flags() {
        let critical = derive_record(&record(&[("Priority", "Critical")]), fixed_now());
        assert!(critical.is_high_priority);
        assert!(critical.is_critical);

        let high = derive_record(&record(&[("Priority", "High")]), fixed_now());
        assert!(high.is_high_priority);
        assert!(!high.is_critical);

        let low = derive_record(&record(&[("Priority", "low")]), fixed_now());
        assert!(!low.is_high_priority);
        assert!(!low.is_critical);
    }

    #[test]
    fn test_status_flags_exact_match() {
        let r = derive_record(&record(&[("STATUS", "not started")]), fixed_now());
        assert!(r.is_not_started);
        assert!(!r.is_complete);

        // "High Priority" is not a known status value
        let odd = derive_record(&record(&[("Status", "High Priority")]), fixed_now());
        assert!(!odd.is_complete && !odd.is_in_progress && !odd.is_not_started);

        let partial = derive_record(&record(&[("Status", "Completed")]), fixed_now());
        assert!(!partial.is_complete);
    }

    #[test]
    fn test_numeric_coercion_per_cell() {
        let r = record(&[("Value 1", "n/a"), ("Gallon Total", "1,250"), ("Cost Estimate", "$300.50")]);
        let derived = derive_record(&r, fixed_now());
        assert_eq!(derived.risk_rating, 0.0);
        assert_eq!(derived.gallons, 1250.0);
        assert_eq!(derived.cost_estimate, 300.5);
    }

    #[test]
    fn test_numeric_coercion_rejects_non_finite() {
        assert_eq!(coerce_number(Some(&CellValue::Number(f64::NAN))), 0.0);
        assert_eq!(coerce_number(Some(&CellValue::from_text("inf"))), 0.0);
        assert_eq!(coerce_number(Some(&CellValue::Bool(true))), 0.0);
    }

    #[test]
    fn test_date_parsing_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        for s in [
            "2024-03-04",
            "04/03/2024",
            "04-03-2024",
            "04.03.2024",
            "2024-03-04T08:30:00",
            "2024-03-04 08:30:00",
            "04/03/2024 08:30",
            "2024-03-04T08:30:00Z",
        ] {
            let parsed = parse_date_str(s).unwrap_or_else(|| panic!("failed to parse {s}"));
            assert_eq!(parsed.date(), expected, "input {s}");
        }
        assert_eq!(parse_date_str("next tuesday"), None);
        assert_eq!(parse_date_str("31/02/2024"), None);
        assert_eq!(parse_date(&CellValue::Number(45000.0)), None);
    }

    #[test]
    fn test_days_since_added_counts_calendar_days() {
        let r = record(&[("DATE ADDED", "2024-06-14T23:59:00")]);
        let derived = derive_record(&r, fixed_now());
        assert_eq!(derived.days_since_added, Some(1));

        let future = record(&[("Date Added", "2024-06-20")]);
        assert_eq!(derive_record(&future, fixed_now()).days_since_added, Some(-5));

        let garbage = record(&[("Date Added", "unknown")]);
        let derived = derive_record(&garbage, fixed_now());
        assert_eq!(derived.date_added, None);
        assert_eq!(derived.days_since_added, None);
    }

    #[test]
    fn test_urgency_score_weights() {
        let r = record(&[
            ("Value 1", "8"),
            ("Priority", "High"),
            ("Date Added", "2024-05-16"),
        ]);
        let derived = derive_record(&r, fixed_now());
        assert_eq!(derived.days_since_added, Some(30));
        let expected = 0.3 * 8.0 + 0.001 * 30.0 + 2.0;
        assert!((derived.urgency_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_derive_table_preserves_rows_and_order() {
        let table = RecordTable::new(
            vec!["Asset Tag".to_string()],
            vec![
                record(&[("Asset Tag", "A2")]),
                record(&[("Asset Tag", "A1")]),
                Record::new(),
            ],
        );
        let enriched = derive_table(&table, fixed_now());
        let tags: Vec<_> = enriched
            .rows
            .iter()
            .map(|r| r.record.text("Asset Tag"))
            .collect();
        assert_eq!(tags, vec![Some("A2".into()), Some("A1".into()), None]);
    }

    #[test]
    fn test_rederiving_flattened_table_is_stable() {
        let table = RecordTable::new(
            vec!["Status".into(), "Priority".into(), "Percent Complete".into()],
            vec![
                record(&[
                    ("Status", "In Progress"),
                    ("Priority", "Critical"),
                    ("Percent Complete", "75%"),
                    ("Value 1", "7.5"),
                    ("DATE ADDED", "01/05/2024"),
                ]),
                record(&[("Percent Complete", ""), ("Date Added", "garbage")]),
            ],
        );
        let once = derive_table(&table, fixed_now());
        let twice = derive_table(&once.flatten(), fixed_now());

        let first: Vec<_> = once.rows.iter().map(|r| r.derived.clone()).collect();
        let second: Vec<_> = twice.rows.iter().map(|r| r.derived.clone()).collect();
        assert_eq!(first, second);
        assert!(twice.has_column("Urgency Score"));
    }

    #[test]
    fn test_display_cell_uses_parsed_values() {
        let r = record(&[("Percent Complete", "40%"), ("Asset Tag", "A9")]);
        let enriched = EnrichedRecord {
            derived: derive_record(&r, fixed_now()),
            record: r,
        };
        assert_eq!(enriched.display_cell("percent complete"), CellValue::Number(40.0));
        assert_eq!(enriched.display_cell("Date Added"), CellValue::Empty);
        assert_eq!(enriched.display_cell("ASSET TAG"), CellValue::from_text("A9"));
    }
}
