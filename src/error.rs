use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Unknown offer type: '{0}'")]
    UnknownOfferType(String),
    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl AppError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::MalformedField { field, reason: reason.into() }
    }

    /// Row-scoped errors are recovered inside the batch loop; everything
    /// else aborts the run and rolls back the open transaction.
    pub fn is_row_scoped(&self) -> bool {
        match self {
            AppError::UnknownOfferType(_) | AppError::MalformedField { .. } => true,
            AppError::Database(e) => !is_connection_error(e),
            _ => false,
        }
    }
}

/// Connection-class failures mean the store itself is gone, not that one
/// row was bad.
pub fn is_connection_error(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Tls(_)
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::UnknownOfferType(name) => {
                (StatusCode::BAD_REQUEST, format!("Unknown offer type: '{}'", name))
            }
            AppError::MalformedField { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::StoreUnavailable(msg) => {
                error!("Store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
