use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::SubmitOfferRequest;
use crate::api::dtos::responses::PendingOfferView;
use crate::domain::models::offer::SURPRISE_BAG_TYPE;
use crate::domain::models::pending::{PendingOfferRow, STATUS_PENDING};
use crate::domain::services::normalizer;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_offer_types(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let types = state.offer_repo.list_offer_types().await?;
    Ok(Json(types))
}

pub async fn list_active_offers(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let offers = state.offer_repo.list_active(restaurant_id).await?;
    Ok(Json(offers))
}

pub async fn list_pending_offers(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Reconcile first so rows approved elsewhere disappear from the queue
    // on the same fetch.
    state.reconciler.reconcile(restaurant_id).await;

    let rows = state.pending_store.read_all().await?;
    let restaurant_key = restaurant_id.to_string();
    let pending: Vec<PendingOfferView> = rows
        .iter()
        .filter(|row| row.restaurant_id.trim() == restaurant_key && row.is_pending())
        .filter_map(PendingOfferView::from_row)
        .collect();
    Ok(Json(pending))
}

pub async fn submit_offer(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<SubmitOfferRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Offer title is required".to_string()));
    }
    // Fail fast on unparseable times instead of letting the approval run
    // discover them later.
    if let Some(t) = payload.valid_start_time.as_deref() {
        normalizer::parse_time("valid_start_time", t)?;
    }
    if let Some(t) = payload.valid_end_time.as_deref() {
        normalizer::parse_time("valid_end_time", t)?;
    }
    if payload.offer_type == SURPRISE_BAG_TYPE {
        match &payload.surprise_bag {
            None => {
                return Err(AppError::Validation(
                    "Surprise Bag offers require surprise_bag details".to_string(),
                ))
            }
            Some(bag) if bag.price <= 0.0 || bag.estimated_value <= 0.0 => {
                return Err(AppError::Validation(
                    "Surprise Bag price and estimated value must be positive".to_string(),
                ))
            }
            Some(_) => {}
        }
    }

    let days = payload.valid_days_of_week.clone().unwrap_or_default();
    let surprise_bag = match &payload.surprise_bag {
        Some(bag) => serde_json::json!({
            "price": bag.price,
            "estimated_value": bag.estimated_value,
            "daily_quantity": bag.daily_quantity,
            "total_quantity": bag.total_quantity,
        })
        .to_string(),
        None => "{}".to_string(),
    };

    let row = PendingOfferRow {
        timestamp: Utc::now().to_rfc3339(),
        restaurant_id: restaurant_id.to_string(),
        restaurant_name: payload.restaurant_name.clone(),
        offer_type: payload.offer_type.clone(),
        title: payload.title.clone(),
        description: payload.description.clone(),
        summary: payload.summary.clone(),
        valid_days_of_week: serde_json::to_string(&days)
            .map_err(|e| AppError::Validation(e.to_string()))?,
        valid_start_time: payload.valid_start_time.clone().unwrap_or_default(),
        valid_end_time: payload.valid_end_time.clone().unwrap_or_default(),
        start_date: payload.start_date.to_string(),
        end_date: payload.end_date.map(|d| d.to_string()).unwrap_or_default(),
        unique_usage_per_user: if payload.unique_usage_per_user { "TRUE" } else { "FALSE" }.to_string(),
        surprise_bag_data: surprise_bag,
        status: STATUS_PENDING.to_string(),
    };

    state.pending_store.append(&row).await?;
    info!("Queued offer '{}' for restaurant {}", row.title, restaurant_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "status": STATUS_PENDING })),
    ))
}
