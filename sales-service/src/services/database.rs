//! PostgreSQL-backed sale store.

use crate::models::{Sale, SaleLineItem};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::SaleStore;
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
    #[instrument(skip(database_url), fields(service = "sales-service"))]
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
impl SaleStore for Database {
    #[instrument(skip(self, sale, items), fields(sale_id = %sale.sale_id))]
    async fn insert_sale(&self, sale: &Sale, items: &[SaleLineItem]) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_sale"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        sqlx::query(
            r#"
            INSERT INTO sales (sale_id, client_id, sale_date, total, status, payment_method, notes, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(sale.sale_id)
        .bind(sale.client_id)
        .bind(sale.sale_date)
        .bind(sale.total)
        .bind(&sale.status)
        .bind(&sale.payment_method)
        .bind(&sale.notes)
        .bind(sale.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_line_items (line_item_id, sale_id, item_id, product_name, size_label, quantity, unit_price, subtotal, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(item.line_item_id)
            .bind(item.sale_id)
            .bind(item.item_id)
            .bind(&item.product_name)
            .bind(&item.size_label)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(item.position)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_sale(&self, sale_id: Uuid) -> Result<Option<Sale>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_sale"])
            .start_timer();

        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE sale_id = $1")
            .bind(sale_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(sale)
    }

    #[instrument(skip(self))]
    async fn find_line_items(&self, sale_id: Uuid) -> Result<Vec<SaleLineItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_line_items"])
            .start_timer();

        let items = sqlx::query_as::<_, SaleLineItem>(
            "SELECT * FROM sale_line_items WHERE sale_id = $1 ORDER BY position",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, sale_id: Uuid, status: &str) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_status"])
            .start_timer();

        let result = sqlx::query("UPDATE sales SET status = $1 WHERE sale_id = $2")
            .bind(status)
            .bind(sale_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        timer.observe_duration();
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_sale(&self, sale_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_sale"])
            .start_timer();

        // line items go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM sales WHERE sale_id = $1")
            .bind(sale_id)
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
