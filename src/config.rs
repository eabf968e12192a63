// src/config.rs

//! Acquisition configuration for the pixellation engine.
//!
//! These structs are deserializable from a configuration file (JSON via
//! [`PixellatorConfig::from_json_str`]; any serde format works) and carry
//! the defaults customary for the supported timing hardware. Validation is
//! separate from parsing: a parsed configuration may still be rejected when
//! the geometry or the marker assignments are unusable.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::NUM_MARKER_BITS;
use crate::geometry::FrameGeometry;

/// Complete configuration consumed by the pixellator at construction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PixellatorConfig {
    /// Scan geometry and timing.
    pub geometry: GeometryConfig,
    /// Marker line assignments.
    pub markers: MarkerConfig,
    /// What to do with an event whose macrotime runs backwards.
    pub out_of_order: OutOfOrderPolicy,
}

impl PixellatorConfig {
    /// Parses a JSON configuration and validates it.
    ///
    /// Missing fields take their defaults, so a partial document is fine.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: PixellatorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks geometry and marker assignments without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.markers.validate()?;
        self.build_geometry().map(|_| ())
    }

    /// Builds the immutable engine geometry.
    ///
    /// With line markers at line ends, the effective line delay is shifted
    /// back by one line interval so that the pixel window covers the line
    /// that *preceded* the marker.
    pub fn build_geometry(&self) -> Result<FrameGeometry, ConfigError> {
        let g = &self.geometry;
        let line_delay = match self.markers.mapping {
            PixelMappingMode::LineStartMarkers => g.line_delay,
            PixelMappingMode::LineEndMarkers => g.line_delay - g.line_interval,
        };
        FrameGeometry::new(
            g.pixels_per_line,
            g.lines_per_frame,
            g.pixel_interval,
            line_delay,
            g.line_interval,
        )
    }
}

/// Scan geometry and timing, in macrotime ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeometryConfig {
    /// Pixels per scanned line.
    pub pixels_per_line: u32,
    /// Lines per frame.
    pub lines_per_frame: u32,
    /// Ticks of dwell time per pixel.
    pub pixel_interval: i64,
    /// Signed offset from a line marker to the start of the line's pixel
    /// window. May be negative.
    pub line_delay: i64,
    /// Total ticks attributed to one scanned line. Independent of
    /// `pixels_per_line * pixel_interval`, so fly-back time can be included.
    pub line_interval: i64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig {
            pixels_per_line: 256,
            lines_per_frame: 256,
            pixel_interval: 100,
            line_delay: 0,
            line_interval: 25_600, // 256 pixels with no fly-back
        }
    }
}

/// Which hardware marker line carries which clock.
///
/// Bits are per-deployment wiring, so these are plain indexes rather than an
/// enum of roles. The line clock is required; frame and pixel clocks are
/// reserved hooks for alternate timing modes and are ignored by the
/// line-clock engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker bit carrying the line clock.
    pub line_bit: u8,
    /// Marker bit carrying the frame clock, if wired.
    pub frame_bit: Option<u8>,
    /// Marker bit carrying the pixel clock, if wired.
    pub pixel_bit: Option<u8>,
    /// Whether line markers fire at line starts or line ends.
    pub mapping: PixelMappingMode,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        MarkerConfig {
            line_bit: 1,
            frame_bit: Some(2),
            pixel_bit: None,
            mapping: PixelMappingMode::default(),
        }
    }
}

impl MarkerConfig {
    /// Rejects out-of-range and duplicate marker assignments.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut used: u16 = 0;
        let assigned = [Some(self.line_bit), self.frame_bit, self.pixel_bit];
        for bit in assigned.into_iter().flatten() {
            if bit >= NUM_MARKER_BITS {
                return Err(ConfigError::MarkerBitOutOfRange(bit));
            }
            let mask = 1u16 << bit;
            if used & mask != 0 {
                return Err(ConfigError::DuplicateMarkerBit(bit));
            }
            used |= mask;
        }
        Ok(())
    }
}

/// Position of line markers relative to the scanned line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelMappingMode {
    /// Markers fire when a line begins.
    LineStartMarkers,
    /// Markers fire when a line ends; the window is shifted back one line
    /// interval. The customary wiring for the supported scanners.
    #[default]
    LineEndMarkers,
}

/// Policy for an event whose macrotime precedes the latest one seen.
///
/// Either way the violation is reported on the sink's error channel first;
/// the stream itself never stops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutOfOrderPolicy {
    /// Process the event as-is, best effort.
    #[default]
    Process,
    /// Discard the event after reporting.
    Drop,
}

/// Converts a length in pixels to macrotime ticks.
///
/// `macrotime_units_tenth_ns` is the hardware's tick length in units of
/// 0.1 ns, as reported at acquisition setup.
pub fn pixels_to_ticks(pixels: f64, pixel_rate_hz: f64, macrotime_units_tenth_ns: u32) -> i64 {
    (1e10 * pixels / pixel_rate_hz / f64::from(macrotime_units_tenth_ns)).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert_eq!(PixellatorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn duplicate_marker_bits_rejected() {
        let mut config = PixellatorConfig::default();
        config.markers.frame_bit = Some(config.markers.line_bit);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateMarkerBit(config.markers.line_bit))
        );
    }

    #[test]
    fn marker_bit_out_of_range_rejected() {
        let mut config = PixellatorConfig::default();
        config.markers.pixel_bit = Some(NUM_MARKER_BITS);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MarkerBitOutOfRange(NUM_MARKER_BITS))
        );
    }

    #[test]
    fn zero_geometry_rejected() {
        let mut config = PixellatorConfig::default();
        config.geometry.pixels_per_line = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPixelsPerLine));
    }

    #[test]
    fn line_end_markers_shift_window_back() {
        let mut config = PixellatorConfig::default();
        config.geometry = GeometryConfig {
            pixels_per_line: 2,
            lines_per_frame: 2,
            pixel_interval: 10,
            line_delay: 0,
            line_interval: 20,
        };
        config.markers.mapping = PixelMappingMode::LineEndMarkers;
        let geometry = config.build_geometry().unwrap();
        // A marker at t=100 closes the line that ran from t=80.
        assert_eq!(geometry.line_start(100), 80);

        config.markers.mapping = PixelMappingMode::LineStartMarkers;
        let geometry = config.build_geometry().unwrap();
        assert_eq!(geometry.line_start(100), 100);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = PixellatorConfig::from_json_str(
            r#"{ "geometry": { "pixels_per_line": 64, "lines_per_frame": 64 } }"#,
        )
        .unwrap();
        assert_eq!(config.geometry.pixels_per_line, 64);
        assert_eq!(config.geometry.pixel_interval, 100);
        assert_eq!(config.markers.line_bit, 1);
        assert_eq!(config.out_of_order, OutOfOrderPolicy::Process);
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let err = PixellatorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn pixels_to_ticks_rounds_to_nearest() {
        // One pixel at 1 MHz with 25 ns ticks: 1 us / 25 ns = 40 ticks.
        assert_eq!(pixels_to_ticks(1.0, 1e6, 250), 40);
        assert_eq!(pixels_to_ticks(0.5, 1e6, 250), 20);
        assert_eq!(pixels_to_ticks(0.0, 1e6, 250), 0);
    }
}
