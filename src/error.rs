// src/error.rs

//! Error types for configuration rejection and lifecycle violations.
//!
//! Data-level stream problems (out-of-order macrotimes, malformed input) are
//! deliberately *not* represented here: the acquisition feed cannot pause, so
//! those are routed to the sink's error channel and processing continues.
//! Only errors that make the engine unusable surface as `Err` values.

use thiserror::Error;

use crate::events::NUM_MARKER_BITS;

/// Rejected configuration; the pixellator is never constructed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pixels per line must be nonzero")]
    ZeroPixelsPerLine,
    #[error("lines per frame must be nonzero")]
    ZeroLinesPerFrame,
    #[error("pixel interval must be positive, got {0}")]
    NonPositivePixelInterval(i64),
    #[error("line interval must be positive, got {0}")]
    NonPositiveLineInterval(i64),
    #[error("marker bit {0} out of range (hardware has {} marker lines)", NUM_MARKER_BITS)]
    MarkerBitOutOfRange(u8),
    #[error("duplicate marker assignment on bit {0}")]
    DuplicateMarkerBit(u8),
    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Lifecycle violation; indicates a caller bug, never silently ignored.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("pixellator is finished; no further events are accepted")]
    Finished,
}
