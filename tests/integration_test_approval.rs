mod common;

use common::{pending_row, TestApp};
use offers_backend::domain::services::approval::Outcome;
use offers_backend::error::AppError;
use sqlx::Row;
use uuid::Uuid;

#[tokio::test]
async fn end_to_end_mixed_batch() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Luigi's").await;

    let mut row_a = pending_row(restaurant_id, "10% Off", "Percent Discount");
    row_a.valid_days_of_week = "[1,3]".to_string();
    let row_b = pending_row(restaurant_id, "Bad Offer", "NotARealType");

    app.pending_store.append(&row_a).await.unwrap();
    app.pending_store.append(&row_b).await.unwrap();

    let report = app.approval_service().approve_all().await.unwrap();

    assert_eq!(report.approved, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.summary(), "1 approved, 1 failed");

    let failure = report
        .outcomes
        .iter()
        .find(|o| o.title == "Bad Offer")
        .expect("Bad Offer should be reported");
    match &failure.outcome {
        Outcome::Failed { reason } => assert!(reason.contains("Unknown offer type")),
        other => panic!("expected failure, got {:?}", other),
    }

    // The approved row landed with its day list intact.
    let db_row = sqlx::query(
        "SELECT valid_days_of_week, json_extract(about, '$.en.title') AS title FROM offers",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(db_row.get::<String, _>("title"), "10% Off");
    assert_eq!(db_row.get::<String, _>("valid_days_of_week"), "[1,3]");
    assert_eq!(app.count_offers().await, 1);

    // The bad row is the only one left in the sheet, still pending.
    let remaining = app.pending_store.read_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Bad Offer");
    assert_eq!(remaining[0].status, "pending");
}

#[tokio::test]
async fn empty_fields_store_as_nulls() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Nullarbor").await;

    let mut row = pending_row(restaurant_id, "All Day Deal", "Special");
    row.valid_start_time = String::new();
    row.valid_end_time = String::new();
    row.end_date = String::new();
    app.pending_store.append(&row).await.unwrap();

    let report = app.approval_service().approve_all().await.unwrap();
    assert_eq!(report.approved, 1);

    let db_row = sqlx::query("SELECT valid_start_time, valid_end_time, end_date FROM offers")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(db_row.get::<Option<String>, _>("valid_start_time"), None);
    assert_eq!(db_row.get::<Option<String>, _>("valid_end_time"), None);
    assert_eq!(db_row.get::<Option<String>, _>("end_date"), None);
}

#[tokio::test]
async fn surprise_bag_copies_daily_quantity() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Bagatelle").await;

    let mut row = pending_row(restaurant_id, "Evening Bag", "Surprise Bag");
    row.surprise_bag_data =
        r#"{"price":5,"estimated_value":12,"daily_quantity":20}"#.to_string();
    app.pending_store.append(&row).await.unwrap();

    let report = app.approval_service().approve_all().await.unwrap();
    assert_eq!(report.approved, 1);

    let bag = sqlx::query(
        "SELECT price, estimated_value, daily_quantity, current_daily_quantity, total_quantity
         FROM surprise_bags",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(bag.get::<f64, _>("price"), 5.0);
    assert_eq!(bag.get::<f64, _>("estimated_value"), 12.0);
    assert_eq!(bag.get::<i32, _>("daily_quantity"), 20);
    assert_eq!(bag.get::<i32, _>("current_daily_quantity"), 20);
    assert_eq!(bag.get::<Option<i32>, _>("total_quantity"), None);
}

#[tokio::test]
async fn bag_failure_rolls_back_its_offer_but_not_siblings() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Halfway House").await;

    let good = pending_row(restaurant_id, "Two For One", "Buy One Get One");
    // price <= 0 violates the surprise_bags CHECK constraint after the
    // offer row has already been inserted.
    let mut bad = pending_row(restaurant_id, "Broken Bag", "Surprise Bag");
    bad.surprise_bag_data = r#"{"price":-5,"estimated_value":12,"daily_quantity":3}"#.to_string();

    app.pending_store.append(&good).await.unwrap();
    app.pending_store.append(&bad).await.unwrap();

    let report = app.approval_service().approve_all().await.unwrap();
    assert_eq!(report.approved, 1);
    assert_eq!(report.failed, 1);

    // The savepoint took the half-written offer down with the bag.
    assert_eq!(app.count_offers().await, 1);
    assert_eq!(app.count_surprise_bags().await, 0);
    let title: String = sqlx::query("SELECT json_extract(about, '$.en.title') AS title FROM offers")
        .fetch_one(&app.pool)
        .await
        .unwrap()
        .get("title");
    assert_eq!(title, "Two For One");

    // The failed row stays in the sheet for another attempt.
    let remaining = app.pending_store.read_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Broken Bag");
}

#[tokio::test]
async fn rows_are_deleted_highest_index_first() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Indexia").await;

    // Pending rows sit at indices 2, 3, 5 and 7; the rest are on hold and
    // must survive in order.
    for index in 0..8 {
        let mut row = pending_row(restaurant_id, &format!("Offer {}", index), "Special");
        if ![2, 3, 5, 7].contains(&index) {
            row.status = "hold".to_string();
        }
        app.pending_store.append(&row).await.unwrap();
    }

    let report = app.approval_service().approve_all().await.unwrap();
    assert_eq!(report.approved, 4);
    assert_eq!(report.failed, 0);

    let remaining = app.pending_store.read_all().await.unwrap();
    let titles: Vec<&str> = remaining.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Offer 0", "Offer 1", "Offer 4", "Offer 6"]);
    assert_eq!(app.count_offers().await, 4);
}

#[tokio::test]
async fn list_pending_is_read_only_and_indexed() {
    let app = TestApp::new().await;
    let restaurant_id = app.seed_restaurant("Readonly").await;

    let mut hold = pending_row(restaurant_id, "Offer 0", "Special");
    hold.status = "hold".to_string();
    app.pending_store.append(&hold).await.unwrap();
    app.pending_store
        .append(&pending_row(restaurant_id, "Offer 1", "Special"))
        .await
        .unwrap();

    let pending = app.approval_service().list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].0, 1);
    assert_eq!(pending[0].1.title, "Offer 1");

    // Listing mutates nothing.
    assert_eq!(app.pending_store.read_all().await.unwrap().len(), 2);
    assert_eq!(app.count_offers().await, 0);
}

#[tokio::test]
async fn sheet_outage_aborts_before_any_mutation() {
    let db_filename = format!("test_{}.db", Uuid::new_v4());
    let sheet_dir = format!("test_sheet_dir_{}", Uuid::new_v4());
    std::fs::create_dir(&sheet_dir).unwrap();

    let app = TestApp::with_sheet_path(db_filename, sheet_dir.clone()).await;

    let err = app.approval_service().approve_all().await.unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
    assert_eq!(app.count_offers().await, 0);

    std::fs::remove_dir_all(&sheet_dir).unwrap();
}
