use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// Multilingual offer text. Only "en" is populated by the submission flow,
/// but the stored JSON shape allows further languages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OfferAbout {
    pub en: AboutText,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AboutText {
    pub title: String,
    pub description: String,
    pub summary: String,
}

impl OfferAbout {
    pub fn english(title: String, description: String, summary: String) -> Self {
        Self {
            en: AboutText { title, description, summary },
        }
    }
}

/// Static lookup row mapping an offer-type display name to its id.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct OfferType {
    pub id: i32,
    pub en: String,
    pub fr: Option<String>,
}

pub const SURPRISE_BAG_TYPE: &str = "Surprise Bag";

/// Validated insert payload produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub restaurant_id: i64,
    pub about: OfferAbout,
    pub offer_type_id: i32,
    pub valid_days_of_week: Option<Vec<i32>>,
    pub valid_start_time: Option<NaiveTime>,
    pub valid_end_time: Option<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub unique_usage_per_user: bool,
    pub surprise_bag: Option<NewSurpriseBag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSurpriseBag {
    pub price: f64,
    pub estimated_value: f64,
    pub daily_quantity: Option<i32>,
    pub current_daily_quantity: Option<i32>,
    pub total_quantity: Option<i32>,
}

impl NewSurpriseBag {
    /// `current_daily_quantity` starts out equal to `daily_quantity`; the
    /// redemption side owns the counter afterwards.
    pub fn new(
        price: f64,
        estimated_value: f64,
        daily_quantity: Option<i32>,
        total_quantity: Option<i32>,
    ) -> Self {
        Self {
            price,
            estimated_value,
            daily_quantity,
            current_daily_quantity: daily_quantity,
            total_quantity,
        }
    }
}

/// Persisted surprise-bag extension row.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SurpriseBag {
    pub offer_id: i64,
    pub price: f64,
    pub estimated_value: f64,
    pub daily_quantity: Option<i32>,
    pub current_daily_quantity: Option<i32>,
    pub total_quantity: Option<i32>,
}

/// One approved offer as served to the dashboard: offer columns joined with
/// its type name, redemption count and surprise-bag details.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActiveOffer {
    pub id: i64,
    pub restaurant_id: i64,
    pub about: OfferAbout,
    pub offer_type_name: String,
    pub valid_days_of_week: Option<Vec<i32>>,
    pub valid_start_time: Option<NaiveTime>,
    pub valid_end_time: Option<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub unique_usage_per_user: bool,
    pub created_at: DateTime<Utc>,
    pub redemption_count: i64,
    pub surprise_bag: Option<SurpriseBag>,
}
