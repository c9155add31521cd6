//! Delivery persistence trait and the in-memory implementation.

use crate::models::Delivery;
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage owned by the delivery service.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert_delivery(&self, delivery: &Delivery) -> Result<(), AppError>;

    async fn find_delivery(&self, delivery_id: Uuid) -> Result<Option<Delivery>, AppError>;

    /// Persist the mutable fields of an existing delivery. Returns whether
    /// a row was updated.
    async fn update_delivery(&self, delivery: &Delivery) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// In-memory store used when no DATABASE_URL is configured, and by tests.
#[derive(Default)]
pub struct InMemoryDeliveryStore {
    deliveries: RwLock<HashMap<Uuid, Delivery>>,
}

impl InMemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn insert_delivery(&self, delivery: &Delivery) -> Result<(), AppError> {
        let mut deliveries = self.deliveries.write().await;
        if deliveries.contains_key(&delivery.delivery_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Delivery {} already exists",
                delivery.delivery_id
            )));
        }
        deliveries.insert(delivery.delivery_id, delivery.clone());
        Ok(())
    }

    async fn find_delivery(&self, delivery_id: Uuid) -> Result<Option<Delivery>, AppError> {
        Ok(self.deliveries.read().await.get(&delivery_id).cloned())
    }

    async fn update_delivery(&self, delivery: &Delivery) -> Result<bool, AppError> {
        let mut deliveries = self.deliveries.write().await;
        match deliveries.get_mut(&delivery.delivery_id) {
            Some(existing) => {
                *existing = delivery.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
