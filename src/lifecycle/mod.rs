//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     close() → broadcast → accept loop stops → Close event
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls Server::close
//! ```
//!
//! # Design Decisions
//! - Closing stops accepting; dispatched connections drain on their own
//! - Closing is idempotent: one broadcast, one Close event

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
