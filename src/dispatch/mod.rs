//! Connection dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Socket + NegotiationOutcome
//!     → dispatcher.rs (transport check, engine selection)
//!     → engine.rs (Engine::serve takes ownership of the socket)
//!     → engine publishes request events until the connection closes
//! ```
//!
//! # Design Decisions
//! - `dispatch` consumes the socket, so a connection cannot be dispatched twice
//! - The dispatcher never reads or writes application bytes
//! - A socket that is unusable at handoff is reported, never retried

pub mod dispatcher;
pub mod engine;

pub use dispatcher::{Dispatcher, Served};
pub use engine::{ConnectionContext, Engine};
