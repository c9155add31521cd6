pub mod database;
pub mod delivery;
pub mod inventory;
pub mod metrics;
pub mod orchestrator;
pub mod store;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
