use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::PersistenceError;
use crate::models::TemperatureRecord;

pub mod temperature;

/// Persistence operations the request handlers depend on.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one record and return its generated id.
    async fn insert_record(&self, record: &TemperatureRecord) -> Result<Uuid, PersistenceError>;

    /// All records for `username`, in insertion order.
    async fn find_by_user(
        &self,
        username: &str,
    ) -> Result<Vec<TemperatureRecord>, PersistenceError>;
}

#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new_with_pool_config(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        // Verify connectivity before serving
        sqlx::query("SELECT 1").execute(&pool).await?;

        info!("Connected to database (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}
