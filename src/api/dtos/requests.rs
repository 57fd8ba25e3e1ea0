use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SubmitOfferRequest {
    pub restaurant_name: String,
    pub offer_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub valid_days_of_week: Option<Vec<i32>>,
    /// "HH:MM" or "HH:MM:SS"; absent means all day.
    #[serde(default)]
    pub valid_start_time: Option<String>,
    #[serde(default)]
    pub valid_end_time: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub unique_usage_per_user: bool,
    #[serde(default)]
    pub surprise_bag: Option<SurpriseBagRequest>,
}

#[derive(Deserialize)]
pub struct SurpriseBagRequest {
    pub price: f64,
    pub estimated_value: f64,
    #[serde(default)]
    pub daily_quantity: Option<i32>,
    #[serde(default)]
    pub total_quantity: Option<i32>,
}
