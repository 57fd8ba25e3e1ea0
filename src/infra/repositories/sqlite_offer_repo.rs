use crate::domain::models::offer::{ActiveOffer, NewOffer, OfferAbout, OfferType, SurpriseBag};
use crate::domain::ports::OfferRepository;
use crate::error::{is_connection_error, AppError};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, Sqlite, SqlitePool, Transaction};

pub struct SqliteOfferRepo {
    pool: SqlitePool,
}

impl SqliteOfferRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferRepository for SqliteOfferRepo {
    async fn list_offer_types(&self) -> Result<Vec<OfferType>, AppError> {
        sqlx::query_as::<_, OfferType>("SELECT id, en, fr FROM offer_types ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn offer_exists(
        &self,
        restaurant_id: i64,
        title: &str,
        offer_type_name: &str,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM offers o
             JOIN offer_types ot ON o.offer_type = ot.id
             WHERE o.restaurant_id = ?
               AND json_extract(o.about, '$.en.title') = ?
               AND ot.en = ?",
        )
        .bind(restaurant_id)
        .bind(title)
        .bind(offer_type_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn insert_batch(&self, offers: &[NewOffer]) -> Result<Vec<Result<i64, AppError>>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut results = Vec::with_capacity(offers.len());

        for offer in offers {
            match insert_one(&mut tx, offer).await {
                Ok(id) => results.push(Ok(id)),
                // A dead connection aborts the batch; the transaction rolls
                // back on drop.
                Err(AppError::Database(e)) if is_connection_error(&e) => {
                    return Err(AppError::Database(e));
                }
                Err(e) => results.push(Err(e)),
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(results)
    }

    async fn list_active(&self, restaurant_id: i64) -> Result<Vec<ActiveOffer>, AppError> {
        let rows = sqlx::query(
            "SELECT o.id, o.restaurant_id, o.about, o.valid_days_of_week,
                    o.valid_start_time, o.valid_end_time, o.start_date, o.end_date,
                    o.unique_usage_per_user, o.created_at,
                    ot.en AS offer_type_name,
                    (SELECT COUNT(*) FROM offer_redemptions r WHERE r.offer_id = o.id) AS redemption_count,
                    sb.price, sb.estimated_value, sb.daily_quantity,
                    sb.current_daily_quantity, sb.total_quantity
             FROM offers o
             JOIN offer_types ot ON o.offer_type = ot.id
             LEFT JOIN surprise_bags sb ON sb.offer_id = o.id
             WHERE o.restaurant_id = ?
             ORDER BY o.created_at DESC, o.id DESC",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.iter().map(map_active_row).collect()
    }
}

/// One savepoint per row: the offer insert and its surprise-bag insert
/// either both land or both vanish, without touching sibling rows.
async fn insert_one(tx: &mut Transaction<'_, Sqlite>, offer: &NewOffer) -> Result<i64, AppError> {
    let about = serde_json::to_string(&offer.about)
        .map_err(|e| AppError::Validation(format!("unserializable about payload: {}", e)))?;
    let days = offer
        .valid_days_of_week
        .as_ref()
        .map(|d| serde_json::to_string(d))
        .transpose()
        .map_err(|e| AppError::Validation(format!("unserializable day list: {}", e)))?;

    let mut sp = tx.begin().await.map_err(AppError::Database)?;

    let row = sqlx::query(
        "INSERT INTO offers (restaurant_id, about, offer_type, valid_days_of_week,
                             valid_start_time, valid_end_time, start_date, end_date,
                             unique_usage_per_user)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(offer.restaurant_id)
    .bind(&about)
    .bind(offer.offer_type_id)
    .bind(&days)
    .bind(offer.valid_start_time)
    .bind(offer.valid_end_time)
    .bind(offer.start_date)
    .bind(offer.end_date)
    .bind(offer.unique_usage_per_user)
    .fetch_one(&mut *sp)
    .await
    .map_err(AppError::Database)?;

    let offer_id: i64 = row.get("id");

    if let Some(bag) = &offer.surprise_bag {
        sqlx::query(
            "INSERT INTO surprise_bags (offer_id, price, estimated_value, daily_quantity,
                                        current_daily_quantity, total_quantity)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(offer_id)
        .bind(bag.price)
        .bind(bag.estimated_value)
        .bind(bag.daily_quantity)
        .bind(bag.current_daily_quantity)
        .bind(bag.total_quantity)
        .execute(&mut *sp)
        .await
        .map_err(AppError::Database)?;
    }

    sp.commit().await.map_err(AppError::Database)?;
    Ok(offer_id)
}

fn map_active_row(row: &SqliteRow) -> Result<ActiveOffer, AppError> {
    let id: i64 = row.try_get("id")?;

    let about_raw: String = row.try_get("about")?;
    let about: OfferAbout = serde_json::from_str(&about_raw)
        .map_err(|e| AppError::malformed("about", e.to_string()))?;

    let days_raw: Option<String> = row.try_get("valid_days_of_week")?;
    let valid_days_of_week = days_raw
        .map(|d| serde_json::from_str::<Vec<i32>>(&d))
        .transpose()
        .map_err(|e| AppError::malformed("valid_days_of_week", e.to_string()))?;

    let created_at: chrono::NaiveDateTime = row.try_get("created_at")?;

    let surprise_bag = match (
        row.try_get::<Option<f64>, _>("price")?,
        row.try_get::<Option<f64>, _>("estimated_value")?,
    ) {
        (Some(price), Some(estimated_value)) => Some(SurpriseBag {
            offer_id: id,
            price,
            estimated_value,
            daily_quantity: row.try_get("daily_quantity")?,
            current_daily_quantity: row.try_get("current_daily_quantity")?,
            total_quantity: row.try_get("total_quantity")?,
        }),
        _ => None,
    };

    Ok(ActiveOffer {
        id,
        restaurant_id: row.try_get("restaurant_id")?,
        about,
        offer_type_name: row.try_get("offer_type_name")?,
        valid_days_of_week,
        valid_start_time: row.try_get("valid_start_time")?,
        valid_end_time: row.try_get("valid_end_time")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        unique_usage_per_user: row.try_get("unique_usage_per_user")?,
        created_at: created_at.and_utc(),
        redemption_count: row.try_get("redemption_count")?,
        surprise_bag,
    })
}
