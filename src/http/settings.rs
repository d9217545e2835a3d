//! HTTP/2 SETTINGS advertised on every multiplexed connection.
//!
//! Unset fields keep hyper's defaults.

use hyper::server::conn::http2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Smallest SETTINGS_MAX_FRAME_SIZE a peer may advertise (RFC 9113 §6.5.2).
pub const MIN_FRAME_SIZE: u32 = 16_384;

/// Largest SETTINGS_MAX_FRAME_SIZE a peer may advertise.
pub const MAX_FRAME_SIZE: u32 = 16_777_215;

/// Largest flow-control window.
pub const MAX_WINDOW_SIZE: u32 = (1 << 31) - 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Http2Settings {
    /// SETTINGS_MAX_CONCURRENT_STREAMS.
    pub max_concurrent_streams: Option<u32>,
    /// SETTINGS_INITIAL_WINDOW_SIZE, per stream.
    pub initial_stream_window_size: Option<u32>,
    /// Connection-level window, grown with WINDOW_UPDATE after the preface.
    pub initial_connection_window_size: Option<u32>,
    /// SETTINGS_MAX_FRAME_SIZE.
    pub max_frame_size: Option<u32>,
    /// SETTINGS_MAX_HEADER_LIST_SIZE.
    pub max_header_list_size: Option<u32>,
}

impl Http2Settings {
    pub fn with_max_concurrent_streams(mut self, streams: u32) -> Self {
        self.max_concurrent_streams = Some(streams);
        self
    }

    pub fn with_initial_stream_window_size(mut self, size: u32) -> Self {
        self.initial_stream_window_size = Some(size);
        self
    }

    pub fn with_initial_connection_window_size(mut self, size: u32) -> Self {
        self.initial_connection_window_size = Some(size);
        self
    }

    pub fn with_max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = Some(size);
        self
    }

    pub fn with_max_header_list_size(mut self, size: u32) -> Self {
        self.max_header_list_size = Some(size);
        self
    }

    /// Reject values no HTTP/2 peer may advertise.
    ///
    /// hyper panics on an out-of-range frame size, so this runs before any
    /// connection is served.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(size) = self.max_frame_size {
            if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&size) {
                return Err(ConfigurationError::Http2Settings(format!(
                    "max_frame_size must be between {MIN_FRAME_SIZE} and {MAX_FRAME_SIZE}, got {size}"
                )));
            }
        }
        for (name, value) in [
            ("initial_stream_window_size", self.initial_stream_window_size),
            ("initial_connection_window_size", self.initial_connection_window_size),
        ] {
            if let Some(size) = value {
                if size > MAX_WINDOW_SIZE {
                    return Err(ConfigurationError::Http2Settings(format!(
                        "{name} must be at most {MAX_WINDOW_SIZE}, got {size}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn apply<E>(&self, builder: &mut http2::Builder<E>) {
        if let Some(streams) = self.max_concurrent_streams {
            builder.max_concurrent_streams(streams);
        }
        if let Some(size) = self.initial_stream_window_size {
            builder.initial_stream_window_size(size);
        }
        if let Some(size) = self.initial_connection_window_size {
            builder.initial_connection_window_size(size);
        }
        if let Some(size) = self.max_frame_size {
            builder.max_frame_size(size);
        }
        if let Some(size) = self.max_header_list_size {
            builder.max_header_list_size(size);
        }
    }
}
