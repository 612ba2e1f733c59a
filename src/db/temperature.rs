use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Row};
use tracing::debug;
use uuid::Uuid;

use super::{Database, RecordStore};
use crate::errors::PersistenceError;
use crate::models::TemperatureRecord;

fn record_from_row(row: &PgRow) -> Result<TemperatureRecord, sqlx::Error> {
    Ok(TemperatureRecord {
        timestamp: row.try_get::<DateTime<Utc>, _>("ts")?,
        username: row.try_get("username")?,
        q1: row.try_get("q1")?,
        q2: row.try_get("q2")?,
        temperature: row.try_get("temperature")?,
        image_key: row.try_get("image_key")?,
    })
}

#[async_trait]
impl RecordStore for Database {
    async fn insert_record(&self, record: &TemperatureRecord) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"INSERT INTO temperature_records (id, ts, username, q1, q2, temperature, image_key)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(id)
        .bind(record.timestamp)
        .bind(&record.username)
        .bind(record.q1)
        .bind(record.q2)
        .bind(record.temperature)
        .bind(&record.image_key)
        .execute(&self.pool)
        .await?;

        debug!("Inserted temperature record {} for {}", id, record.username);
        Ok(id)
    }

    async fn find_by_user(
        &self,
        username: &str,
    ) -> Result<Vec<TemperatureRecord>, PersistenceError> {
        let rows = sqlx::query(
            r#"SELECT ts, username, q1, q2, temperature, image_key
               FROM temperature_records
               WHERE username = $1
               ORDER BY seq ASC"#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Found {} temperature records for {}", records.len(), username);
        Ok(records)
    }
}
