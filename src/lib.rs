// src/lib.rs

//! Event-to-image core of a FLIM acquisition pipeline.
//!
//! This crate turns a time-ordered stream of hardware events (scanner line
//! markers and photon timestamps) into discrete image frames of per-pixel
//! photon events. The central piece is [`LineClockPixellator`], a
//! single-threaded, push-driven state machine that infers pixel and frame
//! boundaries purely from line marker timing and drives a caller-supplied
//! [`PixelPhotonSink`] with begin-frame / end-frame / pixel-photon / error /
//! finish notifications.
//!
//! Upstream record decoding and downstream histogram accumulation are the
//! caller's concern; this crate only defines the contract between them.
//!
//! # Example
//!
//! ```rust
//! use flim_events::{
//!     LineClockPixellator, MarkerEvent, Photon, PixelPhotonEvent, PixelPhotonSink,
//!     PixellatorConfig, TimestampEvent,
//! };
//!
//! struct CountingSink {
//!     photons: usize,
//! }
//!
//! impl PixelPhotonSink for CountingSink {
//!     fn handle_begin_frame(&mut self, _frame: u64) {}
//!     fn handle_end_frame(&mut self, _frame: u64) {}
//!     fn handle_pixel_photon(&mut self, _event: &PixelPhotonEvent) {
//!         self.photons += 1;
//!     }
//!     fn handle_error(&mut self, message: &str) {
//!         eprintln!("stream error: {message}");
//!     }
//!     fn handle_finish(&mut self) {}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PixellatorConfig::from_json_str(
//!     r#"{
//!         "geometry": { "pixels_per_line": 2, "lines_per_frame": 2,
//!                       "pixel_interval": 10, "line_delay": 0, "line_interval": 20 },
//!         "markers": { "line_bit": 1, "mapping": "line_start_markers" }
//!     }"#,
//! )?;
//! let mut lcp = LineClockPixellator::new(&config, CountingSink { photons: 0 })?;
//!
//! lcp.handle_marker(MarkerEvent { bits: 1 << 1, macrotime: 100 })?;
//! lcp.handle_timestamp(TimestampEvent::photon(
//!     105,
//!     Photon { channel: 0, microtime: 0 },
//! ))?;
//! lcp.finish()?;
//!
//! assert_eq!(lcp.sink().photons, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod pixellator;
pub mod sink;

// Re-export the working set at the crate root.
pub use config::{
    pixels_to_ticks, GeometryConfig, MarkerConfig, OutOfOrderPolicy, PixelMappingMode,
    PixellatorConfig,
};
pub use error::{ConfigError, StateError};
pub use events::{
    DecodedEvent, MarkerEvent, Photon, PixelPhotonEvent, TimestampEvent, NUM_MARKER_BITS,
};
pub use geometry::FrameGeometry;
pub use pixellator::LineClockPixellator;
pub use sink::PixelPhotonSink;
