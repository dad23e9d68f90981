//! Explicit tracing initialization
//!
//! The pipeline never configures logging as a side effect of being linked.
//! Embedding applications call [`init`] (or [`init_with_filter`]) once at
//! startup; all diagnostics flow through `tracing` from there.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a fmt subscriber with the default `docpipe=info` filter.
/// `RUST_LOG` overrides the default. Calling twice is a no-op.
pub fn init() {
    init_with_filter("docpipe=info");
}

/// Initialize with an explicit default filter directive.
pub fn init_with_filter(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
