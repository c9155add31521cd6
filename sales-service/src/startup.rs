//! Application startup and lifecycle management.

use crate::config::SalesConfig;
use crate::handlers;
use crate::services::delivery::{DeliveryProvider, DeliveryRequestClient, MockDeliveryProvider};
use crate::services::inventory::{InventoryClient, InventoryProvider, MockInventoryProvider};
use crate::services::orchestrator::SaleOrchestrator;
use crate::services::store::{InMemorySaleStore, SaleStore};
use crate::services::{get_metrics, init_metrics, Database};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: SalesConfig,
    pub store: Arc<dyn SaleStore>,
    pub orchestrator: Arc<SaleOrchestrator>,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "sales-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "sales-service",
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SalesConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn SaleStore> = match &config.database.url {
            Some(url) => {
                let db = Database::new(
                    url,
                    config.database.max_connections,
                    config.database.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                    e
                })?;
                db.run_migrations().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to run migrations");
                    e
                })?;
                Arc::new(db)
            }
            None => {
                tracing::warn!("DATABASE_URL not set - using in-memory sale store");
                Arc::new(InMemorySaleStore::new())
            }
        };

        let inventory: Arc<dyn InventoryProvider> = if config.inventory.http.base_url.is_empty() {
            tracing::warn!("Inventory collaborator not configured - using mock provider");
            Arc::new(MockInventoryProvider::new())
        } else {
            Arc::new(InventoryClient::new(
                config.inventory.http.clone(),
                config.inventory.call_deadline,
            )?)
        };

        let delivery: Arc<dyn DeliveryProvider> = if config.delivery.base_url.is_empty() {
            tracing::warn!("Delivery collaborator not configured - using mock provider");
            Arc::new(MockDeliveryProvider::new())
        } else {
            Arc::new(DeliveryRequestClient::new(config.delivery.clone())?)
        };

        let orchestrator = Arc::new(SaleOrchestrator::new(store.clone(), inventory, delivery));

        let state = AppState {
            config: config.clone(),
            store,
            orchestrator,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Sales service listener bound");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .route("/sales", post(handlers::sales::create_sale))
            .route("/sales/:id", get(handlers::sales::get_sale))
            .route("/sales/:id/summary", get(handlers::sales::get_sale_summary))
            .route("/sales/:id/status", post(handlers::sales::update_sale_status))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(self.state);

        tracing::info!(
            service = "sales-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}
