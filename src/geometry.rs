// src/geometry.rs

//! Frame and pixel geometry.
//!
//! Pure time-to-coordinate arithmetic, fixed at construction. The pixellator
//! owns one `FrameGeometry` and consults it for every event; nothing here
//! mutates or observes stream state.

use crate::error::ConfigError;

/// Immutable geometry and timing of the scan.
///
/// All times are in macrotime ticks and signed: `line_delay` may be negative,
/// and a negative delay can place a line's pixel window before its marker.
/// `line_interval` is independent of `pixels_per_line * pixel_interval` so
/// that fly-back and dead time can be accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pixels_per_line: u32,
    lines_per_frame: u32,
    pixel_interval: i64,
    line_delay: i64,
    line_interval: i64,
}

impl FrameGeometry {
    /// Builds a geometry, rejecting parameters the engine cannot run with.
    pub fn new(
        pixels_per_line: u32,
        lines_per_frame: u32,
        pixel_interval: i64,
        line_delay: i64,
        line_interval: i64,
    ) -> Result<Self, ConfigError> {
        if pixels_per_line == 0 {
            return Err(ConfigError::ZeroPixelsPerLine);
        }
        if lines_per_frame == 0 {
            return Err(ConfigError::ZeroLinesPerFrame);
        }
        if pixel_interval <= 0 {
            return Err(ConfigError::NonPositivePixelInterval(pixel_interval));
        }
        if line_interval <= 0 {
            return Err(ConfigError::NonPositiveLineInterval(line_interval));
        }
        Ok(FrameGeometry {
            pixels_per_line,
            lines_per_frame,
            pixel_interval,
            line_delay,
            line_interval,
        })
    }

    /// Pixel column for a photon at `time` on the line starting at
    /// `line_start`, or `None` when the photon falls before the window or in
    /// the dead time after the active pixels.
    pub fn pixel_index_for(&self, time: i64, line_start: i64) -> Option<u32> {
        if time < line_start {
            return None;
        }
        let index = (time - line_start) / self.pixel_interval;
        if index < i64::from(self.pixels_per_line) {
            Some(index as u32)
        } else {
            None
        }
    }

    /// In-frame row index for the line counted by `total_lines_seen`.
    #[inline]
    pub fn line_in_frame(&self, total_lines_seen: u64) -> u32 {
        (total_lines_seen % u64::from(self.lines_per_frame)) as u32
    }

    /// Start of the pixel window for a line whose marker fired at
    /// `marker_time`.
    #[inline]
    pub fn line_start(&self, marker_time: i64) -> i64 {
        marker_time + self.line_delay
    }

    pub fn pixels_per_line(&self) -> u32 {
        self.pixels_per_line
    }

    pub fn lines_per_frame(&self) -> u32 {
        self.lines_per_frame
    }

    pub fn line_interval(&self) -> i64 {
        self.line_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry_2x2() -> FrameGeometry {
        FrameGeometry::new(2, 2, 10, 0, 20).unwrap()
    }

    #[test]
    fn pixel_index_within_window() {
        let g = geometry_2x2();
        assert_eq!(g.pixel_index_for(100, 100), Some(0));
        assert_eq!(g.pixel_index_for(109, 100), Some(0));
        assert_eq!(g.pixel_index_for(110, 100), Some(1));
        assert_eq!(g.pixel_index_for(119, 100), Some(1));
    }

    #[test]
    fn pixel_index_outside_window() {
        let g = geometry_2x2();
        // Before the window.
        assert_eq!(g.pixel_index_for(99, 100), None);
        // Dead time after the active pixels.
        assert_eq!(g.pixel_index_for(120, 100), None);
        assert_eq!(g.pixel_index_for(1_000_000, 100), None);
    }

    #[test]
    fn pixel_index_is_monotonic_over_window() {
        let g = FrameGeometry::new(8, 1, 7, 0, 64).unwrap();
        let mut last = 0;
        for t in 0..(8 * 7) {
            let index = g.pixel_index_for(t, 0).expect("inside window");
            assert!(index >= last, "index regressed at t={}", t);
            assert!(index < 8);
            last = index;
        }
        assert_eq!(last, 7);
    }

    #[test]
    fn negative_line_start_is_usable() {
        // A negative line delay can push the window before time zero.
        let g = geometry_2x2();
        assert_eq!(g.line_start(5), 5);
        assert_eq!(g.pixel_index_for(-3, -10), Some(0));
        assert_eq!(g.pixel_index_for(3, -10), Some(1));
        assert_eq!(g.pixel_index_for(-11, -10), None);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(FrameGeometry::new(0, 2, 10, 0, 20).is_err());
        assert!(FrameGeometry::new(2, 0, 10, 0, 20).is_err());
        assert!(FrameGeometry::new(2, 2, 0, 0, 20).is_err());
        assert!(FrameGeometry::new(2, 2, 10, 0, -1).is_err());
    }
}
