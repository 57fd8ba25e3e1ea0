use serde::{Deserialize, Serialize};

/// Fixed column order of the pending-offers sheet. The header row must
/// match exactly; `CsvPendingStore` rewrites it if it drifts.
pub const SHEET_HEADERS: [&str; 15] = [
    "timestamp",
    "restaurant_id",
    "restaurant_name",
    "offer_type",
    "title",
    "description",
    "summary",
    "valid_days_of_week",
    "valid_start_time",
    "valid_end_time",
    "start_date",
    "end_date",
    "unique_usage_per_user",
    "surprise_bag_data",
    "status",
];

pub const STATUS_PENDING: &str = "pending";

/// One sheet record, field-for-field. Values stay as the sheet spells them
/// (JSON-encoded sub-fields, boolean-as-string, empty strings for absent
/// values); the normalizer owns all interpretation. A row has no stable id:
/// its position among the data rows, plus the natural key
/// (restaurant_id, title, offer_type), is all the identity there is.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PendingOfferRow {
    pub timestamp: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub offer_type: String,
    pub title: String,
    pub description: String,
    pub summary: String,
    pub valid_days_of_week: String,
    pub valid_start_time: String,
    pub valid_end_time: String,
    pub start_date: String,
    pub end_date: String,
    pub unique_usage_per_user: String,
    pub surprise_bag_data: String,
    pub status: String,
}

impl PendingOfferRow {
    pub fn is_pending(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(STATUS_PENDING)
    }
}
