use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::offer::NewOffer;
use crate::domain::models::pending::PendingOfferRow;
use crate::domain::ports::{OfferRepository, PendingOfferStore};
use crate::domain::services::normalizer;
use crate::error::AppError;

/// Orchestrates the approval batch: sheet read, per-row normalization,
/// transactional insert, then sheet cleanup. Operator confirmation happens
/// before `approve_all` is called; this service never prompts.
pub struct ApprovalService {
    offers: Arc<dyn OfferRepository>,
    pending: Arc<dyn PendingOfferStore>,
}

#[derive(Debug, Serialize, Clone)]
pub struct RowOutcome {
    pub row_index: usize,
    pub title: String,
    pub restaurant_name: String,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Approved { offer_id: i64 },
    Failed { reason: String },
}

#[derive(Debug, Serialize, Clone)]
pub struct ApprovalReport {
    pub approved: usize,
    pub failed: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl ApprovalReport {
    pub fn summary(&self) -> String {
        format!("{} approved, {} failed", self.approved, self.failed)
    }
}

impl ApprovalService {
    pub fn new(offers: Arc<dyn OfferRepository>, pending: Arc<dyn PendingOfferStore>) -> Self {
        Self { offers, pending }
    }

    /// All pending rows with their sheet indices, in sheet order.
    /// Read-only.
    pub async fn list_pending(&self) -> Result<Vec<(usize, PendingOfferRow)>, AppError> {
        let rows = self.pending.read_all().await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.is_pending())
            .collect())
    }

    /// Approve every pending row. Row-scoped failures (unknown type,
    /// malformed fields, per-row insert errors) skip that row and leave it
    /// in the sheet; the remaining rows still commit. Store-level failures
    /// abort the whole run before any sheet mutation.
    pub async fn approve_all(&self) -> Result<ApprovalReport, AppError> {
        let rows = self.pending.read_all().await?;
        let offer_types = self.offers.list_offer_types().await?;

        let mut outcomes: Vec<RowOutcome> = Vec::new();
        let mut batch: Vec<(usize, NewOffer)> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if !row.is_pending() {
                continue;
            }
            match normalizer::normalize(row, &offer_types) {
                Ok(payload) => batch.push((index, payload)),
                Err(e) => {
                    warn!("Skipping row {} ('{}'): {}", index, row.title, e);
                    outcomes.push(failure(index, row, &e));
                }
            }
        }

        let payloads: Vec<NewOffer> = batch.iter().map(|(_, p)| p.clone()).collect();
        let results = self.offers.insert_batch(&payloads).await?;

        let mut to_delete: Vec<usize> = Vec::new();
        for ((index, _), result) in batch.iter().zip(results) {
            let row = &rows[*index];
            match result {
                Ok(offer_id) => {
                    info!("Created offer {} for '{}' ({})", offer_id, row.title, row.restaurant_name);
                    to_delete.push(*index);
                    outcomes.push(RowOutcome {
                        row_index: *index,
                        title: row.title.clone(),
                        restaurant_name: row.restaurant_name.clone(),
                        outcome: Outcome::Approved { offer_id },
                    });
                }
                Err(e) => {
                    warn!("Failed to create offer '{}': {}", row.title, e);
                    outcomes.push(failure(*index, row, &e));
                }
            }
        }

        // Sheet cleanup runs only after the database commit. Highest index
        // first: deleting a lower row would shift every index above it.
        to_delete.sort_unstable_by(|a, b| b.cmp(a));
        let approved = to_delete.len();
        for index in &to_delete {
            self.pending.delete_row(*index).await?;
        }

        outcomes.sort_by_key(|o| o.row_index);
        let failed = outcomes.len() - approved;
        Ok(ApprovalReport { approved, failed, outcomes })
    }
}

fn failure(index: usize, row: &PendingOfferRow, e: &AppError) -> RowOutcome {
    RowOutcome {
        row_index: index,
        title: row.title.clone(),
        restaurant_name: row.restaurant_name.clone(),
        outcome: Outcome::Failed { reason: e.to_string() },
    }
}
