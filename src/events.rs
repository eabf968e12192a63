// src/events.rs

//! Decoded hardware event model.
//!
//! The upstream record decoder turns raw instrument words into these
//! macrotime-stamped events and feeds them, in stream order, to the
//! pixellator. Stream order is assumed to equal time order; the pixellator
//! reports violations but never re-sorts.

/// Number of marker input lines on the timing hardware.
///
/// Marker bit assignments in the configuration must fall below this.
pub const NUM_MARKER_BITS: u8 = 4;

/// One or more marker lines asserted simultaneously.
///
/// `bits` is a plain mask rather than an enum: which bit carries the line,
/// frame, or pixel clock is wired per deployment and supplied through
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerEvent {
    /// Mask of asserted marker lines.
    pub bits: u16,
    /// Hardware tick count at which the markers fired.
    pub macrotime: u64,
}

impl MarkerEvent {
    /// Returns true if the marker line at `bit` is asserted.
    #[inline]
    pub fn has_bit(&self, bit: u8) -> bool {
        self.bits & (1u16 << bit) != 0
    }
}

/// Photon detection payload, carried through to the emitted pixel event
/// unchanged. Routing policy between channels is not this crate's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Photon {
    /// Detection channel the photon was routed to.
    pub channel: u8,
    /// Arrival time within the excitation period (TCSPC microtime).
    pub microtime: u16,
}

/// A timestamped event from the photon stream.
///
/// With `photon` set this is a detected photon; with `photon` unset it is a
/// synthetic "last known time" probe, used by callers to advance the
/// pixellator's notion of elapsed time without contributing counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampEvent {
    /// Hardware tick count of the detection or probe.
    pub macrotime: u64,
    /// Photon payload, if any.
    pub photon: Option<Photon>,
}

impl TimestampEvent {
    /// A bare timestamp carrying no photon.
    pub fn probe(macrotime: u64) -> Self {
        TimestampEvent {
            macrotime,
            photon: None,
        }
    }

    /// A detected photon at `macrotime`.
    pub fn photon(macrotime: u64, photon: Photon) -> Self {
        TimestampEvent {
            macrotime,
            photon: Some(photon),
        }
    }
}

/// A decoded hardware event, as produced by the upstream record decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Scanner marker lines asserted.
    Marker(MarkerEvent),
    /// Photon detection or timing probe.
    Timestamp(TimestampEvent),
}

impl DecodedEvent {
    /// Macrotime of the event, independent of variant.
    pub fn macrotime(&self) -> u64 {
        match self {
            DecodedEvent::Marker(m) => m.macrotime,
            DecodedEvent::Timestamp(t) => t.macrotime,
        }
    }
}

/// A photon resolved to a pixel coordinate within a frame.
///
/// Emitted only for photons falling inside a currently open, time-bounded
/// pixel window; everything else is discarded upstream of the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPhotonEvent {
    /// Index of the frame the photon belongs to.
    pub frame: u64,
    /// Pixel column, in `[0, pixels_per_line)`.
    pub x: u32,
    /// Pixel row, in `[0, lines_per_frame)`.
    pub y: u32,
    /// The photon payload, unchanged from the source event.
    pub photon: Photon,
}
