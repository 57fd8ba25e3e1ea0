use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{OfferRepository, PendingOfferStore};
use crate::domain::services::reconciler::ReconcileService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub offer_repo: Arc<dyn OfferRepository>,
    pub pending_store: Arc<dyn PendingOfferStore>,
    pub reconciler: Arc<ReconcileService>,
}
