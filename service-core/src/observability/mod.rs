//! Tracing initialization shared by the service entry points.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies
/// globally with the service's own crate raised to debug.
pub fn init_tracing(service_name: &str, log_level: &str) {
    let crate_target = service_name.replace('-', "_");
    let default_filter = format!("{},{}=debug", log_level, crate_target);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
