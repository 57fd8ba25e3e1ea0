use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::models::offer::{NewOffer, NewSurpriseBag, OfferAbout, OfferType};
use crate::domain::models::pending::PendingOfferRow;
use crate::error::AppError;

/// Convert a raw sheet row into a validated insert payload.
///
/// Pure apart from the read-only offer-type lookup the caller passes in.
/// Every failure is row-scoped: the caller skips the row and keeps going.
pub fn normalize(row: &PendingOfferRow, offer_types: &[OfferType]) -> Result<NewOffer, AppError> {
    let offer_type = offer_types
        .iter()
        .find(|t| t.en == row.offer_type)
        .ok_or_else(|| AppError::UnknownOfferType(row.offer_type.clone()))?;

    let restaurant_id = row
        .restaurant_id
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::malformed("restaurant_id", e.to_string()))?;

    let start_date = parse_date("start_date", &row.start_date)?
        .ok_or_else(|| AppError::malformed("start_date", "must not be empty"))?;

    Ok(NewOffer {
        restaurant_id,
        about: OfferAbout::english(
            row.title.clone(),
            row.description.clone(),
            row.summary.clone(),
        ),
        offer_type_id: offer_type.id,
        valid_days_of_week: parse_days(&row.valid_days_of_week)?,
        valid_start_time: parse_time("valid_start_time", &row.valid_start_time)?,
        valid_end_time: parse_time("valid_end_time", &row.valid_end_time)?,
        start_date,
        end_date: parse_date("end_date", &row.end_date)?,
        unique_usage_per_user: parse_bool(&row.unique_usage_per_user),
        surprise_bag: parse_surprise_bag(&row.surprise_bag_data)?,
    })
}

/// JSON-encoded weekday list; empty cell or empty list means "all days".
pub fn parse_days(raw: &str) -> Result<Option<Vec<i32>>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let days: Vec<i32> = serde_json::from_str(raw)
        .map_err(|e| AppError::malformed("valid_days_of_week", e.to_string()))?;
    if days.is_empty() {
        return Ok(None);
    }
    Ok(Some(days))
}

/// The submission UI wrote both `HH:MM` and `HH:MM:SS` over time.
pub fn parse_time(field: &'static str, raw: &str) -> Result<Option<NaiveTime>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map(Some)
        .map_err(|e| AppError::malformed(field, e.to_string()))
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| AppError::malformed(field, e.to_string()))
}

pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[derive(Deserialize)]
struct SurpriseBagData {
    price: f64,
    estimated_value: f64,
    #[serde(default)]
    daily_quantity: Option<i32>,
    #[serde(default)]
    total_quantity: Option<i32>,
}

/// Empty cell and `{}` both mean "no surprise bag" — the submission flow
/// stored an empty JSON object for every plain offer.
pub fn parse_surprise_bag(raw: &str) -> Result<Option<NewSurpriseBag>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::malformed("surprise_bag_data", e.to_string()))?;
    match &value {
        Value::Object(map) if map.is_empty() => return Ok(None),
        Value::Object(_) => {}
        other => {
            return Err(AppError::malformed(
                "surprise_bag_data",
                format!("expected a JSON object, got {}", other),
            ))
        }
    }
    let data: SurpriseBagData = serde_json::from_value(value)
        .map_err(|e| AppError::malformed("surprise_bag_data", e.to_string()))?;
    Ok(Some(NewSurpriseBag::new(
        data.price,
        data.estimated_value,
        data.daily_quantity,
        data.total_quantity,
    )))
}
