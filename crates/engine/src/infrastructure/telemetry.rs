//! Tracing subscriber setup for hosts embedding the engine.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::settings::CacheSettings;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `settings.log_filter`. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(settings: &CacheSettings) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.log_filter.as_str().into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
