//! service-core: Shared infrastructure for the order-management services.
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
