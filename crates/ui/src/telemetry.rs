use tracing_subscriber::EnvFilter;

use crate::settings::state::DEFAULT_LOG_FILTER;

/// Installs the fmt subscriber.
///
/// `RUST_LOG` wins over `filter`; an unparsable filter falls back to `info`.
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
}
