pub mod database;
pub mod directory;
pub mod enrichment;
pub mod metrics;
pub mod store;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
