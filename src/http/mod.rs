//! HTTP protocol engines.
//!
//! # Data Flow
//! ```text
//! Dispatched connection
//!     → engine.rs (hyper http2 or http1 connection driver)
//!     → settings.rs (SETTINGS advertised by the http2 driver)
//!     → Request event published on the server's event bus
//!     → axum Router produces the response
//! ```

pub mod engine;
pub mod settings;

pub use engine::HttpEngine;
pub use settings::Http2Settings;
