use crate::domain::models::{
    offer::{ActiveOffer, NewOffer, OfferType},
    pending::PendingOfferRow,
};
use crate::error::AppError;
use async_trait::async_trait;

/// The spreadsheet holding operator-submitted offers awaiting approval.
/// Rows are addressed by their 0-based position among the data rows as
/// returned by `read_all`; callers deleting several rows must do so in
/// descending index order.
#[async_trait]
pub trait PendingOfferStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<PendingOfferRow>, AppError>;
    async fn append(&self, row: &PendingOfferRow) -> Result<(), AppError>;
    async fn delete_row(&self, index: usize) -> Result<(), AppError>;
}

/// The relational store of approved offers.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn list_offer_types(&self) -> Result<Vec<OfferType>, AppError>;

    /// Existence check by natural key: (restaurant, english title,
    /// offer-type display name), exact string equality through the
    /// offer_types join.
    async fn offer_exists(
        &self,
        restaurant_id: i64,
        title: &str,
        offer_type_name: &str,
    ) -> Result<bool, AppError>;

    /// Insert a batch of normalized offers in one transaction, one
    /// savepoint per row. The outer `Err` means the whole batch was rolled
    /// back (connection-class failure); the inner results carry each row's
    /// new offer id or its row-scoped failure.
    async fn insert_batch(
        &self,
        offers: &[NewOffer],
    ) -> Result<Vec<Result<i64, AppError>>, AppError>;

    async fn list_active(&self, restaurant_id: i64) -> Result<Vec<ActiveOffer>, AppError>;
}
