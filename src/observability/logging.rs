//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber for the binary
//! - Build standalone subscribers for servers that get their own log sink
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for `level`, applied to this crate and the HTTP stack.
pub fn default_directive(level: &str) -> String {
    format!("h2_alpn_server={level},hyper={level},rustls=warn")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// A subscriber that is not installed globally, for injecting into a server.
pub fn dispatch_for(level: &str) -> Dispatch {
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(default_directive(level)))
        .with(tracing_subscriber::fmt::layer());
    Dispatch::new(subscriber)
}
