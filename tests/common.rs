use offers_backend::{
    api::router::create_router,
    config::Config,
    domain::models::pending::PendingOfferRow,
    domain::ports::{OfferRepository, PendingOfferStore},
    domain::services::approval::ApprovalService,
    domain::services::reconciler::ReconcileService,
    infra::repositories::sqlite_offer_repo::SqliteOfferRepo,
    infra::sheets::csv_store::CsvPendingStore,
    state::AppState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use axum::Router;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub sheet_filename: String,
    pub offer_repo: Arc<dyn OfferRepository>,
    pub pending_store: Arc<dyn PendingOfferStore>,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let sheet_filename = format!("test_sheet_{}.csv", Uuid::new_v4());
        Self::with_sheet_path(db_filename, sheet_filename).await
    }

    /// Point the pending store at an unreadable path (e.g. a directory) to
    /// simulate spreadsheet-store outage.
    pub async fn with_sheet_path(db_filename: String, sheet_filename: String) -> Self {
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            pending_sheet_path: sheet_filename.clone(),
        };

        let offer_repo: Arc<dyn OfferRepository> = Arc::new(SqliteOfferRepo::new(pool.clone()));
        let pending_store: Arc<dyn PendingOfferStore> =
            Arc::new(CsvPendingStore::new(sheet_filename.clone()));
        let reconciler = Arc::new(ReconcileService::new(
            offer_repo.clone(),
            pending_store.clone(),
        ));

        let state = Arc::new(AppState {
            config,
            offer_repo: offer_repo.clone(),
            pending_store: pending_store.clone(),
            reconciler,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            sheet_filename,
            offer_repo,
            pending_store,
            state,
        }
    }

    pub fn approval_service(&self) -> ApprovalService {
        ApprovalService::new(self.offer_repo.clone(), self.pending_store.clone())
    }

    pub fn reconcile_service(&self) -> ReconcileService {
        ReconcileService::new(self.offer_repo.clone(), self.pending_store.clone())
    }

    pub async fn seed_restaurant(&self, name: &str) -> i64 {
        let row = sqlx::query("INSERT INTO restaurants (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to seed restaurant");
        row.get("id")
    }

    pub async fn count_offers(&self) -> i64 {
        let row = sqlx::query("SELECT COUNT(*) as count FROM offers")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count offers");
        row.get("count")
    }

    pub async fn count_surprise_bags(&self) -> i64 {
        let row = sqlx::query("SELECT COUNT(*) as count FROM surprise_bags")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count surprise bags");
        row.get("count")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(&self.sheet_filename);
    }
}

/// A well-formed pending row; tests tweak the fields they care about.
#[allow(dead_code)]
pub fn pending_row(restaurant_id: i64, title: &str, offer_type: &str) -> PendingOfferRow {
    PendingOfferRow {
        timestamp: "2026-08-01T09:00:00+00:00".to_string(),
        restaurant_id: restaurant_id.to_string(),
        restaurant_name: "Test Bistro".to_string(),
        offer_type: offer_type.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        summary: format!("{} summary", title),
        valid_days_of_week: "[]".to_string(),
        valid_start_time: String::new(),
        valid_end_time: String::new(),
        start_date: "2026-08-01".to_string(),
        end_date: String::new(),
        unique_usage_per_user: "FALSE".to_string(),
        surprise_bag_data: "{}".to_string(),
        status: "pending".to_string(),
    }
}
