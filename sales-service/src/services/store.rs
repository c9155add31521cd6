//! Sale persistence trait and the in-memory implementation.

use crate::models::{Sale, SaleLineItem};
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage owned by the sales service. The sale plus line-items insert is
/// atomic: either everything lands or nothing does.
#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn insert_sale(&self, sale: &Sale, items: &[SaleLineItem]) -> Result<(), AppError>;

    async fn find_sale(&self, sale_id: Uuid) -> Result<Option<Sale>, AppError>;

    /// Line items in cart order.
    async fn find_line_items(&self, sale_id: Uuid) -> Result<Vec<SaleLineItem>, AppError>;

    /// Returns whether a sale row was updated.
    async fn update_status(&self, sale_id: Uuid, status: &str) -> Result<bool, AppError>;

    /// Remove the sale and its line items. Used to roll back the local
    /// write after a failed fulfillment. Returns whether a row was removed.
    async fn delete_sale(&self, sale_id: Uuid) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// In-memory store used when no DATABASE_URL is configured, and by tests.
#[derive(Default)]
pub struct InMemorySaleStore {
    sales: RwLock<HashMap<Uuid, Sale>>,
    line_items: RwLock<HashMap<Uuid, Vec<SaleLineItem>>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sale_count(&self) -> usize {
        self.sales.read().await.len()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn insert_sale(&self, sale: &Sale, items: &[SaleLineItem]) -> Result<(), AppError> {
        let mut sales = self.sales.write().await;
        if sales.contains_key(&sale.sale_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Sale {} already exists",
                sale.sale_id
            )));
        }
        sales.insert(sale.sale_id, sale.clone());
        self.line_items
            .write()
            .await
            .insert(sale.sale_id, items.to_vec());
        Ok(())
    }

    async fn find_sale(&self, sale_id: Uuid) -> Result<Option<Sale>, AppError> {
        Ok(self.sales.read().await.get(&sale_id).cloned())
    }

    async fn find_line_items(&self, sale_id: Uuid) -> Result<Vec<SaleLineItem>, AppError> {
        Ok(self
            .line_items
            .read()
            .await
            .get(&sale_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_status(&self, sale_id: Uuid, status: &str) -> Result<bool, AppError> {
        let mut sales = self.sales.write().await;
        match sales.get_mut(&sale_id) {
            Some(sale) => {
                sale.status = status.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_sale(&self, sale_id: Uuid) -> Result<bool, AppError> {
        let removed = self.sales.write().await.remove(&sale_id).is_some();
        self.line_items.write().await.remove(&sale_id);
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
