//! Compile-time defaults and runtime configuration for the graph display

use core::num::NonZeroU32;

use embassy_time::Duration;
use embedded_graphics::geometry::Size;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::history::Reading;
use crate::mapping::ASSUMED_MAX_IAQ;

/// Width of the reference SSD1306 panel in pixels.
pub const DISPLAY_WIDTH_PX: u32 = 128;

/// Height of the reference SSD1306 panel in pixels.
pub const DISPLAY_HEIGHT_PX: u32 = 64;

/// Text baseline of the first reading row in pixels
pub const FIRST_ROW_BASELINE_PX: i32 = 12;

/// Text baseline of the second reading row in pixels
pub const SECOND_ROW_BASELINE_PX: i32 = 30;

/// VOC values at or below this are one glyph narrower and get shifted right.
pub const VOC_NARROW_THRESHOLD: f32 = 10.0;

/// Horizontal shift applied to narrow VOC values in pixels
pub const VOC_NARROW_OFFSET_PX: i32 = 10;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Display width must be non-zero")]
    ZeroWidth,
    #[error("Display height must be non-zero")]
    ZeroHeight,
    #[error("Frame is {frame_width}x{frame_height} but config expects {width}x{height}")]
    GeometryMismatch {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Physical panel geometry. The history buffer is exactly `width` readings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH_PX,
            height: DISPLAY_HEIGHT_PX,
        }
    }
}

/// How history readings are scaled onto pixel rows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Reading that maps to the full display height.
    pub assumed_max: NonZeroU32,
    /// Value every history slot holds before the first ingest.
    pub baseline: Reading,
    /// Keep out-of-range readings on screen instead of drawing past the edge.
    pub clamp: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            assumed_max: ASSUMED_MAX_IAQ,
            baseline: 0,
            clamp: false,
        }
    }
}

/// Placement of the four numeric readings above the graph.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub first_row_baseline: i32,
    pub second_row_baseline: i32,
    pub voc_narrow_threshold: f32,
    pub voc_narrow_offset: i32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            first_row_baseline: FIRST_ROW_BASELINE_PX,
            second_row_baseline: SECOND_ROW_BASELINE_PX,
            voc_narrow_threshold: VOC_NARROW_THRESHOLD,
            voc_narrow_offset: VOC_NARROW_OFFSET_PX,
        }
    }
}

/// Sampling cadence of the control loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplingConfig {
    /// Minimum spacing between history ingests in milliseconds.
    ///
    /// `None` ingests on every ready poll. When set, ready polls still redraw
    /// the readings but only push into the history once the interval elapsed.
    pub ingest_interval_ms: Option<u64>,
}

impl SamplingConfig {
    pub fn ingest_interval(&self) -> Option<Duration> {
        self.ingest_interval_ms.map(Duration::from_millis)
    }
}

/// Complete runtime configuration of the sample loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub display: DisplayConfig,
    pub graph: GraphConfig,
    pub text: TextLayout,
    pub sampling: SamplingConfig,
}

impl Config {
    /// Check invariants that the types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.display.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        Ok(())
    }

    /// Check that a frame of `frame` size can hold the configured graph.
    pub fn check_frame(&self, frame: Size) -> Result<(), ConfigError> {
        if frame != Size::new(self.display.width, self.display.height) {
            return Err(ConfigError::GeometryMismatch {
                width: self.display.width,
                height: self.display.height,
                frame_width: frame.width,
                frame_height: frame.height,
            });
        }
        Ok(())
    }

    /// Builder-style override of the ingest throttle.
    pub fn with_ingest_interval(mut self, interval: Duration) -> Self {
        self.sampling.ingest_interval_ms = Some(interval.as_millis());
        self
    }
}
