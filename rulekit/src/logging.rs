//! Subscriber setup for test runs

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Install a fmt subscriber that writes through the test harness
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless, and so is another subscriber already being set.
pub fn init() {
    init_with_filter("info");
}

pub fn init_with_filter(default_filter: &str) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .try_init();
    });
}
