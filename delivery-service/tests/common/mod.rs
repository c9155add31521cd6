use delivery_service::config::{DatabaseConfig, DeliveryConfig};
use delivery_service::startup::Application;
use service_core::config::Config as CoreConfig;
use service_core::http::HttpClientConfig;
use std::time::Duration;
use wiremock::MockServer;

/// The application booted on a random port against wiremock collaborators
/// and the in-memory store. Collaborator timeouts are kept tight so that
/// degraded-path tests stay fast.
pub struct TestApp {
    pub http_address: String,
    pub sales_server: MockServer,
    pub users_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let sales_server = MockServer::start().await;
        let users_server = MockServer::start().await;

        let config = DeliveryConfig {
            common: CoreConfig { port: 0 },
            service_name: "delivery-service-test".to_string(),
            log_level: "info".to_string(),
            database: DatabaseConfig {
                url: None,
                max_connections: 2,
                min_connections: 1,
            },
            sales: HttpClientConfig {
                base_url: sales_server.uri(),
                connect_timeout: Duration::from_millis(500),
                request_timeout: Duration::from_millis(300),
            },
            users: HttpClientConfig {
                base_url: users_server.uri(),
                connect_timeout: Duration::from_millis(500),
                request_timeout: Duration::from_millis(300),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let http_address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the HTTP server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            sales_server,
            users_server,
        }
    }
}
