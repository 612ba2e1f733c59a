//! Record store tests against a real Postgres.
//!
//! These run only when TEST_DATABASE_URL points at a disposable database.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use taketemp::db::{Database, RecordStore};
use taketemp::models::{TemperatureForm, TemperatureRecord};

async fn test_database() -> Option<Database> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("Warning: TEST_DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = Database::new_with_pool_config(&url, 2, 0)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    Some(db)
}

fn record(username: &str, temperature: &str, image_key: Option<&str>) -> TemperatureRecord {
    let form = TemperatureForm {
        username: Some(username.to_string()),
        q1: Some("true".to_string()),
        q2: Some("false".to_string()),
        temperature: Some(temperature.to_string()),
    };
    // Postgres keeps microseconds, so use a whole-second timestamp
    let ts = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap();
    TemperatureRecord::from_form_at(&form, image_key.map(str::to_string), ts)
}

#[tokio::test]
async fn test_insert_and_find_in_insertion_order() {
    let Some(db) = test_database().await else { return };
    let username = format!("user-{}", Uuid::new_v4());

    let first = record(&username, "36.6", Some("key-one"));
    let second = record(&username, "37.1", None);

    let first_id = db.insert_record(&first).await.unwrap();
    let second_id = db.insert_record(&second).await.unwrap();
    assert_ne!(first_id, second_id);

    let found = db.find_by_user(&username).await.unwrap();
    assert_eq!(found, vec![first, second]);
}

#[tokio::test]
async fn test_nan_temperature_round_trips() {
    let Some(db) = test_database().await else { return };
    let username = format!("user-{}", Uuid::new_v4());

    db.insert_record(&record(&username, "not-a-number", None))
        .await
        .unwrap();

    let found = db.find_by_user(&username).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].temperature.is_nan());
}

#[tokio::test]
async fn test_find_unknown_user_is_empty() {
    let Some(db) = test_database().await else { return };

    let found = db.find_by_user(&format!("nobody-{}", Uuid::new_v4())).await.unwrap();
    assert!(found.is_empty());
}
