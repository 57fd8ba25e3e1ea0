use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{OfferRepository, PendingOfferStore};

/// Removes pending sheet rows whose offer already exists in the relational
/// store, so manual or batch approvals converge both stores. Best-effort by
/// contract: any store failure leaves the sheet untouched and never fails
/// the caller.
pub struct ReconcileService {
    offers: Arc<dyn OfferRepository>,
    pending: Arc<dyn PendingOfferStore>,
}

impl ReconcileService {
    pub fn new(offers: Arc<dyn OfferRepository>, pending: Arc<dyn PendingOfferStore>) -> Self {
        Self { offers, pending }
    }

    /// Returns the number of rows removed. Running it again without
    /// intervening database changes removes nothing.
    pub async fn reconcile(&self, restaurant_id: i64) -> usize {
        let rows = match self.pending.read_all().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Reconciliation skipped, pending store unavailable: {}", e);
                return 0;
            }
        };

        let restaurant_key = restaurant_id.to_string();
        let mut to_delete: Vec<usize> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if row.restaurant_id.trim() != restaurant_key || !row.is_pending() {
                continue;
            }
            match self
                .offers
                .offer_exists(restaurant_id, &row.title, &row.offer_type)
                .await
            {
                Ok(true) => to_delete.push(index),
                Ok(false) => {}
                Err(e) => {
                    // DB hiccup: leave the row in place, a later pass will
                    // pick it up.
                    warn!("Existence check failed for '{}': {}", row.title, e);
                }
            }
        }

        // Collected up front, deleted highest index first — interleaving
        // reads and deletes would invalidate the remaining indices.
        to_delete.sort_unstable_by(|a, b| b.cmp(a));
        let mut deleted = 0;
        for index in to_delete {
            match self.pending.delete_row(index).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!("Stopped reconciliation at row {}: {}", index, e);
                    break;
                }
            }
        }

        if deleted > 0 {
            info!("Reconciled {} pending offer(s) for restaurant {}", deleted, restaurant_id);
        }
        deleted
    }
}
