//! Inventory collaborator client.
//!
//! One capability: adjust an item's stock by a signed delta. Sales send a
//! negative delta per line item; compensations send the matching positive
//! delta. Calls are never retried.

use crate::services::metrics::COLLABORATOR_REQUEST_DURATION;
use async_trait::async_trait;
use serde::Serialize;
use service_core::error::AppError;
use service_core::http::HttpClientConfig;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// A single stock movement against the inventory collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    /// Carried in the URL, not the body.
    #[serde(skip)]
    pub item_id: i64,
    pub delta: i32,
    pub reason: String,
    pub actor_id: i64,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory rejected the adjustment: status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("inventory call timed out after {0:?}")]
    Timeout(Duration),

    #[error("inventory unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Apply one stock adjustment. Not idempotent: callers must issue
    /// exactly one call per movement.
    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError>;
}

/// HTTP client for the inventory collaborator.
pub struct InventoryClient {
    client: reqwest::Client,
    config: HttpClientConfig,
    call_deadline: Duration,
}

impl InventoryClient {
    pub fn new(config: HttpClientConfig, call_deadline: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: config.build_client()?,
            config,
            call_deadline,
        })
    }
}

#[async_trait]
impl InventoryProvider for InventoryClient {
    #[tracing::instrument(skip(self, adjustment), fields(item_id = adjustment.item_id, delta = adjustment.delta))]
    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError> {
        let url = self.config.url(&format!(
            "/inventory/items/{}/stock-adjustments",
            adjustment.item_id
        ));

        let timer = COLLABORATOR_REQUEST_DURATION
            .with_label_values(&["inventory"])
            .start_timer();

        let send = self.client.post(&url).json(adjustment).send();
        let response = match tokio::time::timeout(self.call_deadline, send).await {
            Err(_) => {
                timer.observe_duration();
                return Err(InventoryError::Timeout(self.call_deadline));
            }
            Ok(Err(e)) if e.is_timeout() => {
                timer.observe_duration();
                return Err(InventoryError::Timeout(self.config.request_timeout));
            }
            Ok(Err(e)) => {
                timer.observe_duration();
                return Err(InventoryError::Transport(e.to_string()));
            }
            Ok(Ok(response)) => response,
        };
        timer.observe_duration();

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, "Stock adjustment acknowledged");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(InventoryError::Rejected {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        })
    }
}

/// Recording mock used when no inventory collaborator is configured, and by
/// tests. Successful adjustments are recorded in call order.
#[derive(Default)]
pub struct MockInventoryProvider {
    fail_items: Mutex<HashSet<i64>>,
    adjustments: Mutex<Vec<StockAdjustment>>,
}

impl MockInventoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make decrements (not compensations) for this item fail.
    pub async fn fail_item(&self, item_id: i64) {
        self.fail_items.lock().await.insert(item_id);
    }

    pub async fn adjustments(&self) -> Vec<StockAdjustment> {
        self.adjustments.lock().await.clone()
    }
}

#[async_trait]
impl InventoryProvider for MockInventoryProvider {
    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), InventoryError> {
        if adjustment.delta < 0 && self.fail_items.lock().await.contains(&adjustment.item_id) {
            return Err(InventoryError::Rejected {
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        self.adjustments.lock().await.push(adjustment.clone());
        tracing::info!(
            item_id = adjustment.item_id,
            delta = adjustment.delta,
            "[MOCK] Stock adjustment recorded"
        );
        Ok(())
    }
}
