//! Delivery collaborator client.
//!
//! Creates the delivery record tracking a completed sale. Best-effort from
//! the orchestrator's perspective: the caller decides what a failure means.

use crate::services::metrics::COLLABORATOR_REQUEST_DURATION;
use async_trait::async_trait;
use serde::Serialize;
use service_core::error::AppError;
use service_core::http::HttpClientConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRequest {
    pub sale_id: Uuid,
    pub initial_status: String,
}

#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<(), AppError>;
}

/// HTTP client for the delivery collaborator.
pub struct DeliveryRequestClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl DeliveryRequestClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

#[async_trait]
impl DeliveryProvider for DeliveryRequestClient {
    #[tracing::instrument(skip(self, request), fields(sale_id = %request.sale_id))]
    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<(), AppError> {
        let url = self.config.url("/deliveries");

        let timer = COLLABORATOR_REQUEST_DURATION
            .with_label_values(&["delivery"])
            .start_timer();
        let result = self.client.post(&url).json(request).send().await;
        timer.observe_duration();

        let response =
            result.map_err(|e| AppError::BadGateway(format!("delivery request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, "Delivery request accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::BadGateway(format!(
            "delivery request rejected: status {}: {}",
            status, body
        )))
    }
}

/// Recording mock used when no delivery collaborator is configured, and by
/// tests.
#[derive(Default)]
pub struct MockDeliveryProvider {
    failing: AtomicBool,
    requests: Mutex<Vec<DeliveryRequest>>,
}

impl MockDeliveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn requests(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl DeliveryProvider for MockDeliveryProvider {
    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::BadGateway("mock delivery failure".to_string()));
        }

        self.requests.lock().await.push(request.clone());
        tracing::info!(sale_id = %request.sale_id, "[MOCK] Delivery request recorded");
        Ok(())
    }
}
