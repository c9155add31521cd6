//! PostgreSQL-backed delivery store.

use crate::models::Delivery;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::DeliveryStore;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "delivery-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for Database {
    #[instrument(skip(self, delivery), fields(delivery_id = %delivery.delivery_id))]
    async fn insert_delivery(&self, delivery: &Delivery) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_delivery"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO deliveries (delivery_id, sale_id, carrier_id, status, assigned_utc, completed_utc, address, area_id, notes, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(delivery.delivery_id)
        .bind(delivery.sale_id)
        .bind(delivery.carrier_id)
        .bind(&delivery.status)
        .bind(delivery.assigned_utc)
        .bind(delivery.completed_utc)
        .bind(&delivery.address)
        .bind(delivery.area_id)
        .bind(&delivery.notes)
        .bind(delivery.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_delivery(&self, delivery_id: Uuid) -> Result<Option<Delivery>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_delivery"])
            .start_timer();

        let delivery =
            sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE delivery_id = $1")
                .bind(delivery_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(delivery)
    }

    #[instrument(skip(self, delivery), fields(delivery_id = %delivery.delivery_id))]
    async fn update_delivery(&self, delivery: &Delivery) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_delivery"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE deliveries
            SET carrier_id = $1, status = $2, assigned_utc = $3, completed_utc = $4, address = $5, area_id = $6, notes = $7
            WHERE delivery_id = $8
            "#,
        )
        .bind(delivery.carrier_id)
        .bind(&delivery.status)
        .bind(delivery.assigned_utc)
        .bind(delivery.completed_utc)
        .bind(&delivery.address)
        .bind(delivery.area_id)
        .bind(&delivery.notes)
        .bind(delivery.delivery_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
