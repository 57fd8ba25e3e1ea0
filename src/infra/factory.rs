use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{OfferRepository, PendingOfferStore};
use crate::domain::services::reconciler::ReconcileService;
use crate::error::AppError;
use crate::infra::repositories::{
    postgres_offer_repo::PostgresOfferRepo, sqlite_offer_repo::SqliteOfferRepo,
};
use crate::infra::sheets::csv_store::CsvPendingStore;
use crate::state::AppState;

/// Owner of the connection pool. The server keeps it for the process
/// lifetime; the admin CLI acquires it at run start and must call `close`
/// on every exit path.
pub enum DatabaseHandle {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DatabaseHandle {
    pub fn offer_repo(&self) -> Arc<dyn OfferRepository> {
        match self {
            DatabaseHandle::Postgres(pool) => Arc::new(PostgresOfferRepo::new(pool.clone())),
            DatabaseHandle::Sqlite(pool) => Arc::new(SqliteOfferRepo::new(pool.clone())),
        }
    }

    pub async fn close(&self) {
        match self {
            DatabaseHandle::Postgres(pool) => pool.close().await,
            DatabaseHandle::Sqlite(pool) => pool.close().await,
        }
    }
}

/// Connect to whichever backend the URL names and run its migrations.
/// Every failure here is run-scoped: nothing has been mutated yet.
pub async fn connect_database(database_url: &str) -> Result<DatabaseHandle, AppError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url
            .parse()
            .map_err(|e: sqlx::Error| AppError::StoreUnavailable(e.to_string()))?;
        opts = opts
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("postgres: {}", e)))?;

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("postgres migrations: {}", e)))?;

        Ok(DatabaseHandle::Postgres(pool))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("sqlite: {}", e)))?;

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("sqlite migrations: {}", e)))?;

        Ok(DatabaseHandle::Sqlite(pool))
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let db = connect_database(&config.database_url)
        .await
        .expect("Failed to connect to database");
    let offer_repo = db.offer_repo();
    let pending_store: Arc<dyn PendingOfferStore> =
        Arc::new(CsvPendingStore::new(config.pending_sheet_path.clone()));

    let reconciler = Arc::new(ReconcileService::new(
        offer_repo.clone(),
        pending_store.clone(),
    ));

    AppState {
        config: config.clone(),
        offer_repo,
        pending_store,
        reconciler,
    }
}
