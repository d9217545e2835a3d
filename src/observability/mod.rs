//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server construction, accept loop, connections:
//!     → tracing spans (component = "http", connection_id, peer_addr)
//!     → logging.rs (fmt subscriber, EnvFilter)
//! ```
//!
//! # Design Decisions
//! - A server logs through the dispatch given in its options, or the one
//!   current when it was constructed
//! - Request/error/close notifications are events, not log lines

pub mod logging;

pub use logging::{dispatch_for, init_logging};
