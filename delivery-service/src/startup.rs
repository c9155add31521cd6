//! Application startup and lifecycle management.

use crate::config::DeliveryConfig;
use crate::handlers;
use crate::services::directory::{
    ClientProvider, MockClientProvider, MockSalesProvider, SalesClient, SalesProvider, UsersClient,
};
use crate::services::enrichment::DeliveryEnricher;
use crate::services::store::{DeliveryStore, InMemoryDeliveryStore};
use crate::services::{get_metrics, init_metrics, Database};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
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
    pub config: DeliveryConfig,
    pub store: Arc<dyn DeliveryStore>,
    pub enricher: Arc<DeliveryEnricher>,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "delivery-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "delivery-service",
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
    pub async fn build(config: DeliveryConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn DeliveryStore> = match &config.database.url {
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
                tracing::warn!("DATABASE_URL not set - using in-memory delivery store");
                Arc::new(InMemoryDeliveryStore::new())
            }
        };

        let sales: Arc<dyn SalesProvider> = if config.sales.base_url.is_empty() {
            tracing::warn!("Sales collaborator not configured - using mock provider");
            Arc::new(MockSalesProvider::new())
        } else {
            Arc::new(SalesClient::new(config.sales.clone())?)
        };

        let clients: Arc<dyn ClientProvider> = if config.users.base_url.is_empty() {
            tracing::warn!("Users collaborator not configured - using mock provider");
            Arc::new(MockClientProvider::new())
        } else {
            Arc::new(UsersClient::new(config.users.clone())?)
        };

        let enricher = Arc::new(DeliveryEnricher::new(sales, clients));

        let state = AppState {
            config: config.clone(),
            store,
            enricher,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Delivery service listener bound");

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
            .route("/deliveries", post(handlers::deliveries::create_delivery))
            .route("/deliveries/:id", get(handlers::deliveries::get_delivery))
            .route(
                "/deliveries/:id/view",
                get(handlers::deliveries::get_delivery_view),
            )
            .route(
                "/deliveries/:id/status",
                patch(handlers::deliveries::update_delivery_status),
            )
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(self.state);

        tracing::info!(
            service = "delivery-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}
