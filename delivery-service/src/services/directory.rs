//! Read-only clients for the sales and users collaborators.
//!
//! Both answer `Ok(None)` when the record does not exist and `Err` when the
//! collaborator could not be asked. The enricher turns that distinction into
//! the view's resolution tags.

use crate::models::{ClientSummary, SaleSummary};
use crate::services::metrics::COLLABORATOR_REQUEST_DURATION;
use async_trait::async_trait;
use service_core::error::AppError;
use service_core::http::HttpClientConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait SalesProvider: Send + Sync {
    async fn sale_summary(&self, sale_id: Uuid) -> Result<Option<SaleSummary>, AppError>;
}

#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn client_summary(&self, client_id: i64) -> Result<Option<ClientSummary>, AppError>;
}

/// HTTP client for the sales collaborator.
pub struct SalesClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl SalesClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

#[async_trait]
impl SalesProvider for SalesClient {
    #[tracing::instrument(skip(self))]
    async fn sale_summary(&self, sale_id: Uuid) -> Result<Option<SaleSummary>, AppError> {
        let url = self.config.url(&format!("/sales/{}/summary", sale_id));

        let timer = COLLABORATOR_REQUEST_DURATION
            .with_label_values(&["sales"])
            .start_timer();
        let result = self.client.get(&url).send().await;
        timer.observe_duration();

        let response =
            result.map_err(|e| AppError::BadGateway(format!("sales lookup failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadGateway(format!(
                "sales lookup rejected: status {}: {}",
                status, body
            )));
        }

        let summary = response
            .json::<SaleSummary>()
            .await
            .map_err(|e| AppError::BadGateway(format!("invalid sales response: {}", e)))?;
        Ok(Some(summary))
    }
}

/// HTTP client for the users collaborator.
pub struct UsersClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl UsersClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

#[async_trait]
impl ClientProvider for UsersClient {
    #[tracing::instrument(skip(self))]
    async fn client_summary(&self, client_id: i64) -> Result<Option<ClientSummary>, AppError> {
        let url = self.config.url(&format!("/clients/{}", client_id));

        let timer = COLLABORATOR_REQUEST_DURATION
            .with_label_values(&["users"])
            .start_timer();
        let result = self.client.get(&url).send().await;
        timer.observe_duration();

        let response =
            result.map_err(|e| AppError::BadGateway(format!("users lookup failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadGateway(format!(
                "users lookup rejected: status {}: {}",
                status, body
            )));
        }

        let summary = response
            .json::<ClientSummary>()
            .await
            .map_err(|e| AppError::BadGateway(format!("invalid users response: {}", e)))?;
        Ok(Some(summary))
    }
}

/// Scriptable mock used when no sales collaborator is configured, and by
/// tests.
#[derive(Default)]
pub struct MockSalesProvider {
    unavailable: AtomicBool,
    summaries: Mutex<HashMap<Uuid, SaleSummary>>,
}

impl MockSalesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, summary: SaleSummary) {
        self.summaries.lock().await.insert(summary.sale_id, summary);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl SalesProvider for MockSalesProvider {
    async fn sale_summary(&self, sale_id: Uuid) -> Result<Option<SaleSummary>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable);
        }
        Ok(self.summaries.lock().await.get(&sale_id).cloned())
    }
}

/// Scriptable mock used when no users collaborator is configured, and by
/// tests.
#[derive(Default)]
pub struct MockClientProvider {
    unavailable: AtomicBool,
    clients: Mutex<HashMap<i64, ClientSummary>>,
}

impl MockClientProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, summary: ClientSummary) {
        self.clients.lock().await.insert(summary.client_id, summary);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClientProvider for MockClientProvider {
    async fn client_summary(&self, client_id: i64) -> Result<Option<ClientSummary>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable);
        }
        Ok(self.clients.lock().await.get(&client_id).cloned())
    }
}
