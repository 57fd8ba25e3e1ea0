use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::domain::models::offer::{NewSurpriseBag, OfferAbout};
use crate::domain::models::pending::PendingOfferRow;
use crate::domain::services::normalizer;

/// A pending sheet row in normalized form, as the dashboard renders it.
#[derive(Serialize)]
pub struct PendingOfferView {
    pub timestamp: String,
    pub offer_type: String,
    pub about: OfferAbout,
    pub valid_days_of_week: Option<Vec<i32>>,
    pub valid_start_time: Option<NaiveTime>,
    pub valid_end_time: Option<NaiveTime>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub unique_usage_per_user: bool,
    pub surprise_bag: Option<NewSurpriseBag>,
    pub status: String,
}

impl PendingOfferView {
    /// Malformed rows render as `None` and are skipped by the listing
    /// rather than failing the whole page.
    pub fn from_row(row: &PendingOfferRow) -> Option<Self> {
        Some(Self {
            timestamp: row.timestamp.clone(),
            offer_type: row.offer_type.clone(),
            about: OfferAbout::english(
                row.title.clone(),
                row.description.clone(),
                row.summary.clone(),
            ),
            valid_days_of_week: normalizer::parse_days(&row.valid_days_of_week).ok()?,
            valid_start_time: normalizer::parse_time("valid_start_time", &row.valid_start_time)
                .ok()?,
            valid_end_time: normalizer::parse_time("valid_end_time", &row.valid_end_time).ok()?,
            start_date: normalizer::parse_date("start_date", &row.start_date).ok()?,
            end_date: normalizer::parse_date("end_date", &row.end_date).ok()?,
            unique_usage_per_user: normalizer::parse_bool(&row.unique_usage_per_user),
            surprise_bag: normalizer::parse_surprise_bag(&row.surprise_bag_data).ok()?,
            status: row.status.clone(),
        })
    }
}
