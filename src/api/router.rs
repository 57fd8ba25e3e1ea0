use axum::{
    body::Body,
    extract::Request,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{health, offer};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Lookup
        .route("/api/v1/offer-types", get(offer::list_offer_types))

        // Offers per restaurant
        .route("/api/v1/restaurants/{restaurant_id}/offers", get(offer::list_active_offers).post(offer::submit_offer))
        .route("/api/v1/restaurants/{restaurant_id}/offers/pending", get(offer::list_pending_offers))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
