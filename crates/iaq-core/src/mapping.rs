//! Value-to-pixel mapping for the history graph

use core::num::NonZeroU32;

use crate::history::Reading;

/// Practical ceiling of the static IAQ index used to scale the graph.
pub const ASSUMED_MAX_IAQ: NonZeroU32 = match NonZeroU32::new(400) {
    Some(max) => max,
    None => unreachable!(),
};

/// Height of a graph column for `reading`, in pixels above the bottom edge.
///
/// `floor(reading * display_height / assumed_max)`, computed in 64-bit so
/// the product cannot overflow. Readings above `assumed_max` produce heights
/// above `display_height`; the result is not clamped.
pub fn column_height(reading: Reading, display_height: u32, assumed_max: NonZeroU32) -> i32 {
    let scaled = i64::from(reading) * i64::from(display_height);
    let height = scaled.div_euclid(i64::from(assumed_max.get()));
    height.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Like [`column_height`] but limited to the visible range `0..=display_height`.
pub fn clamped_column_height(
    reading: Reading,
    display_height: u32,
    assumed_max: NonZeroU32,
) -> i32 {
    let limit = i32::try_from(display_height).unwrap_or(i32::MAX);
    column_height(reading, display_height, assumed_max).clamp(0, limit)
}

/// Screen row for a column height, with y growing downwards from the top.
///
/// A height of zero maps to `display_height`, one row below the visible area.
pub fn column_row(height: i32, display_height: u32) -> i32 {
    let bottom = i32::try_from(display_height).unwrap_or(i32::MAX);
    bottom.saturating_sub(height)
}
