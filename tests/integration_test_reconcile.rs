mod common;

use common::{pending_row, TestApp};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

/// Insert an approved offer directly, the way a manual SQL approval would.
async fn insert_offer(pool: &Pool<Sqlite>, restaurant_id: i64, title: &str, offer_type: &str) {
    let type_id: i32 = sqlx::query("SELECT id FROM offer_types WHERE en = ?")
        .bind(offer_type)
        .fetch_one(pool)
        .await
        .expect("offer type must exist")
        .get("id");

    let about = serde_json::json!({
        "en": { "title": title, "description": "", "summary": "" }
    })
    .to_string();

    sqlx::query(
        "INSERT INTO offers (restaurant_id, about, offer_type, start_date, unique_usage_per_user)
         VALUES (?, ?, ?, ?, 0)",
    )
    .bind(restaurant_id)
    .bind(about)
    .bind(type_id)
    .bind("2026-08-01")
    .execute(pool)
    .await
    .expect("offer insert failed");
}

#[tokio::test]
async fn removes_matching_rows_and_is_idempotent() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Syncline").await;
    let other_id = app.seed_restaurant("Other Place").await;

    insert_offer(&app.pool, restaurant_id, "Lunch Special", "Special").await;

    // Matching row, non-matching title, and a row for another restaurant.
    app.pending_store
        .append(&pending_row(restaurant_id, "Lunch Special", "Special"))
        .await
        .unwrap();
    app.pending_store
        .append(&pending_row(restaurant_id, "Dinner Special", "Special"))
        .await
        .unwrap();
    app.pending_store
        .append(&pending_row(other_id, "Lunch Special", "Special"))
        .await
        .unwrap();

    let deleted = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted, 1);

    let remaining = app.pending_store.read_all().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().any(|r| r.title == "Dinner Special"));
    assert!(remaining
        .iter()
        .any(|r| r.restaurant_id == other_id.to_string()));

    // Second pass with no database changes deletes nothing further.
    let deleted_again = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted_again, 0);
    assert_eq!(app.pending_store.read_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deletes_descending_with_multiple_matches() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Indexia").await;
    let other_id = app.seed_restaurant("Bystander").await;

    // Approved rows sit at sheet indices 2, 3, 5 and 7.
    for index in 0..8 {
        let owner = if [2, 3, 5, 7].contains(&index) {
            restaurant_id
        } else {
            other_id
        };
        app.pending_store
            .append(&pending_row(owner, &format!("Offer {}", index), "Special"))
            .await
            .unwrap();
    }
    for index in [2, 3, 5, 7] {
        insert_offer(&app.pool, restaurant_id, &format!("Offer {}", index), "Special").await;
    }

    let deleted = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted, 4);

    let remaining = app.pending_store.read_all().await.unwrap();
    let titles: Vec<&str> = remaining.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Offer 0", "Offer 1", "Offer 4", "Offer 6"]);
}

#[tokio::test]
async fn matching_is_exact_and_case_sensitive() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Precision").await;

    insert_offer(&app.pool, restaurant_id, "10% off", "Percent Discount").await;
    app.pending_store
        .append(&pending_row(restaurant_id, "10% Off", "Percent Discount"))
        .await
        .unwrap();

    let deleted = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted, 0);
    assert_eq!(app.pending_store.read_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn tolerates_sheet_outage() {
    let db_filename = format!("test_{}.db", Uuid::new_v4());
    let sheet_dir = format!("test_sheet_dir_{}", Uuid::new_v4());
    std::fs::create_dir(&sheet_dir).unwrap();

    let app = TestApp::with_sheet_path(db_filename, sheet_dir.clone()).await;
    let restaurant_id = app.seed_restaurant("Outage Cafe").await;

    let deleted = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted, 0);

    std::fs::remove_dir_all(&sheet_dir).unwrap();
}

#[tokio::test]
async fn tolerates_database_outage() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Flaky DB").await;

    insert_offer(&app.pool, restaurant_id, "Lunch Special", "Special").await;
    app.pending_store
        .append(&pending_row(restaurant_id, "Lunch Special", "Special"))
        .await
        .unwrap();

    app.pool.close().await;

    // Existence checks fail, so nothing may be deleted.
    let deleted = app.reconcile_service().reconcile(restaurant_id).await;
    assert_eq!(deleted, 0);
    assert_eq!(app.pending_store.read_all().await.unwrap().len(), 1);
}
