//! Recognized field names.
//!
//! Lookups are normalized (see [`super::normalize_field_name`]), so these
//! match the upper-case headers common in exported sheets as well.

pub const STATUS: &str = "Status";
pub const PRIORITY: &str = "Priority";
pub const PERCENT_COMPLETE: &str = "Percent Complete";
pub const GALLON_TOTAL: &str = "Gallon Total";
/// Risk rating column
pub const VALUE_1: &str = "Value 1";
pub const DATE_ADDED: &str = "Date Added";
pub const ASSET_TAG: &str = "Asset Tag";
pub const LOCATION_DESCRIPTION: &str = "Location Description";
pub const DECK_LEVEL: &str = "Deck Level";
pub const DESCRIPTION: &str = "Description";
pub const ASSIGNED_TO: &str = "Assigned To";
pub const ESTIMATED_HOURS: &str = "Estimated Hours";
pub const COST_ESTIMATE: &str = "Cost Estimate";

/// Columns shown in record listings, in display order.
pub const TABLE_FIELDS: [&str; 6] = [
    DATE_ADDED,
    ASSET_TAG,
    LOCATION_DESCRIPTION,
    STATUS,
    PRIORITY,
    PERCENT_COMPLETE,
];

/// Columns shown in a status drill-down, in display order.
pub const DRILLDOWN_FIELDS: [&str; 5] = [
    ASSET_TAG,
    LOCATION_DESCRIPTION,
    PRIORITY,
    PERCENT_COMPLETE,
    DATE_ADDED,
];

/// Names of the columns added by derivation when a table is flattened.
pub mod derived {
    pub const IS_COMPLETE: &str = "Is Complete";
    pub const IS_IN_PROGRESS: &str = "Is In Progress";
    pub const IS_NOT_STARTED: &str = "Is Not Started";
    pub const IS_HIGH_PRIORITY: &str = "Is High Priority";
    pub const IS_CRITICAL: &str = "Is Critical";
    pub const GALLONS: &str = "Gallons";
    pub const RISK_RATING: &str = "Risk Rating";
    pub const DAYS_SINCE_ADDED: &str = "Days Since Added";
    pub const URGENCY_SCORE: &str = "Urgency Score";
}
