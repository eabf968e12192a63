// src/pixellator/mod.rs

//! The line-clock pixellator state machine.
//!
//! Consumes decoded events one at a time and drives a [`PixelPhotonSink`]
//! with begin-frame, end-frame, pixel-photon, error, and finish
//! notifications. Frame and pixel boundaries are inferred purely from line
//! marker timing; there is no lookahead and no internal event buffering
//! beyond the current line's window state.
//!
//! Frame closing happens one of two ways:
//! - eagerly, when the first line marker of the *next* frame arrives;
//! - lazily, at [`flush`](LineClockPixellator::flush) or
//!   [`finish`](LineClockPixellator::finish), when the frame's last line has
//!   received its marker *and* the stream has been observed past that line's
//!   full interval. A frame whose last line never got a marker stays open:
//!   without the marker the engine cannot know the final line's window ever
//!   started, so the frame's completeness is genuinely undetermined and no
//!   end-frame is reported for it.

use log::{debug, trace, warn};

use crate::config::{OutOfOrderPolicy, PixellatorConfig};
use crate::error::{ConfigError, StateError};
use crate::events::{DecodedEvent, MarkerEvent, PixelPhotonEvent, TimestampEvent};
use crate::geometry::FrameGeometry;
use crate::sink::PixelPhotonSink;

/// Streaming engine assigning photons to pixels of successive frames.
///
/// One instance processes one ordered event stream. Instances share nothing;
/// independent channels get independent pixellators.
#[derive(Debug)]
pub struct LineClockPixellator<S: PixelPhotonSink> {
    geometry: FrameGeometry,
    line_marker_bit: u8,
    out_of_order: OutOfOrderPolicy,

    /// Accepted line markers since construction.
    total_lines_seen: u64,
    /// Start of the current line's pixel window; `None` before the first
    /// line marker.
    line_start_time: Option<i64>,
    /// Frame currently open or about to open.
    frame: u64,
    frame_open: bool,
    /// Largest macrotime observed on any event; drives end-of-stream
    /// completion inference only.
    last_observed_time: i64,
    finished: bool,

    sink: S,
}

impl<S: PixelPhotonSink> LineClockPixellator<S> {
    /// Builds a pixellator from a validated configuration, or rejects the
    /// configuration. The sink is owned for the engine's lifetime; pass
    /// `&mut sink` to keep ownership at the call site.
    pub fn new(config: &PixellatorConfig, sink: S) -> Result<Self, ConfigError> {
        config.markers.validate()?;
        let geometry = config.build_geometry()?;
        Ok(LineClockPixellator {
            geometry,
            line_marker_bit: config.markers.line_bit,
            out_of_order: config.out_of_order,
            total_lines_seen: 0,
            line_start_time: None,
            frame: 0,
            frame_open: false,
            last_observed_time: i64::MIN,
            finished: false,
            sink,
        })
    }

    /// Dispatches a decoded event to the matching handler.
    pub fn handle_event(&mut self, event: DecodedEvent) -> Result<(), StateError> {
        match event {
            DecodedEvent::Marker(marker) => self.handle_marker(marker),
            DecodedEvent::Timestamp(timestamp) => self.handle_timestamp(timestamp),
        }
    }

    /// Processes a marker event.
    ///
    /// A line-clock marker starts a new line and, on a frame boundary,
    /// closes the open frame and opens the next. Frame-clock and pixel-clock
    /// bits are reserved for timing modes this engine does not implement and
    /// are ignored.
    pub fn handle_marker(&mut self, event: MarkerEvent) -> Result<(), StateError> {
        self.ensure_accepting()?;
        if !self.check_order("marker", event.macrotime) {
            return Ok(());
        }
        if event.has_bit(self.line_marker_bit) {
            self.start_line(event.macrotime);
        } else {
            trace!(
                "ignoring marker bits {:#06b} at t={} (no line clock)",
                event.bits,
                event.macrotime
            );
        }
        self.observe_time(event.macrotime);
        Ok(())
    }

    /// Processes a photon or timing probe.
    ///
    /// A photon inside the current line's pixel window is emitted as a
    /// [`PixelPhotonEvent`]; anything else (probe, fly-back, before the
    /// first line, after a lazily closed frame) only advances the observed
    /// time. Dropping those photons is steady-state behavior, not an error.
    pub fn handle_timestamp(&mut self, event: TimestampEvent) -> Result<(), StateError> {
        self.ensure_accepting()?;
        if !self.check_order("timestamp", event.macrotime) {
            return Ok(());
        }
        self.observe_time(event.macrotime);

        let Some(photon) = event.photon else {
            return Ok(());
        };
        if !self.frame_open {
            return Ok(());
        }
        let Some(line_start) = self.line_start_time else {
            return Ok(());
        };
        if let Some(x) = self.geometry.pixel_index_for(event.macrotime as i64, line_start) {
            let y = self.geometry.line_in_frame(self.total_lines_seen - 1);
            let pixel_photon = PixelPhotonEvent {
                frame: self.frame,
                x,
                y,
                photon,
            };
            trace!("photon at t={} -> ({}, {})", event.macrotime, x, y);
            self.sink.handle_pixel_photon(&pixel_photon);
        }
        Ok(())
    }

    /// Re-evaluates whether the open frame's last line has fully elapsed and
    /// closes the frame if so. Idempotent: with no new events, a second call
    /// emits nothing.
    pub fn flush(&mut self) -> Result<(), StateError> {
        self.ensure_accepting()?;
        self.complete_trailing_frame();
        Ok(())
    }

    /// Forwards an advisory message to the sink's error channel.
    ///
    /// Engine state is untouched; the stream continues to be processed.
    pub fn handle_error(&mut self, message: &str) {
        self.sink.handle_error(message);
    }

    /// Runs the trailing-frame completion check, tells the sink that no
    /// further events will arrive, and retires the engine. Any later call to
    /// an event handler or `flush` fails with [`StateError::Finished`].
    pub fn finish(&mut self) -> Result<(), StateError> {
        self.ensure_accepting()?;
        self.complete_trailing_frame();
        self.sink.handle_finish();
        self.finished = true;
        Ok(())
    }

    /// Whether [`finish`](Self::finish) has retired this engine.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the engine, releasing its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn ensure_accepting(&self) -> Result<(), StateError> {
        if self.finished {
            Err(StateError::Finished)
        } else {
            Ok(())
        }
    }

    /// Reports a non-monotonic macrotime to the sink. Returns false when the
    /// configured policy says the event must be discarded.
    fn check_order(&mut self, kind: &str, macrotime: u64) -> bool {
        if (macrotime as i64) >= self.last_observed_time {
            return true;
        }
        warn!(
            "out-of-order {} at t={} (last observed t={})",
            kind, macrotime, self.last_observed_time
        );
        self.sink.handle_error(&format!(
            "out-of-order {} macrotime {} after {}",
            kind, macrotime, self.last_observed_time
        ));
        self.out_of_order == OutOfOrderPolicy::Process
    }

    fn observe_time(&mut self, macrotime: u64) {
        self.last_observed_time = self.last_observed_time.max(macrotime as i64);
    }

    /// A line-clock marker fired at `macrotime`.
    fn start_line(&mut self, macrotime: u64) {
        let line_in_frame = self.geometry.line_in_frame(self.total_lines_seen);
        if line_in_frame == 0 {
            // This marker starts a new frame.
            if self.frame_open {
                debug!("frame {} complete (next frame's first line)", self.frame);
                self.sink.handle_end_frame(self.frame);
                self.frame += 1;
                self.frame_open = false;
            }
            debug!("frame {} begins at t={}", self.frame, macrotime);
            self.sink.handle_begin_frame(self.frame);
            self.frame_open = true;
        }
        self.line_start_time = Some(self.geometry.line_start(macrotime as i64));
        self.total_lines_seen += 1;
    }

    /// Closes the open frame if its last line has started and the stream has
    /// been observed past that line's full interval. Lacking the last line's
    /// marker, the frame stays open no matter how much time has passed.
    fn complete_trailing_frame(&mut self) {
        if !self.frame_open {
            return;
        }
        let Some(line_start) = self.line_start_time else {
            return;
        };
        let last_line = self.geometry.lines_per_frame() - 1;
        if self.geometry.line_in_frame(self.total_lines_seen - 1) != last_line {
            return;
        }
        if self.last_observed_time - line_start < self.geometry.line_interval() {
            return;
        }
        debug!("frame {} complete (last line elapsed)", self.frame);
        self.sink.handle_end_frame(self.frame);
        self.frame += 1;
        self.frame_open = false;
    }
}
