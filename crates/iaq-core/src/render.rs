//! Rendering of the numeric overlay and the history graph
//!
//! Layout on the reference 128x64 panel:
//!
//! ```text
//! +----------------+----------------+
//! | IAQ            | static IAQ     |  baseline y = 12
//! | CO2 eq (.1)    | bVOC eq        |  baseline y = 30
//! +----------------+----------------+
//! |   .   ..  .       graph         |  one pixel per history slot
//! +---------------------------------+
//! ```

use core::fmt::Write;

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::config::{GraphConfig, TextLayout};
use crate::history::HistoryBuffer;
use crate::mapping::{clamped_column_height, column_height, column_row};
use crate::sensor::SensorOutputs;

/// Longest formatted reading: sign, the 39 integer digits of `f32::MAX`,
/// the decimal point and up to eight decimals.
const MAX_VALUE_LEN: usize = 49;

/// Shown instead of a value that does not fit the text buffer
const OVERFLOW_MARKER: &str = "###";

/// Default number of decimals, matching how the readings have always been printed.
const DEFAULT_PRECISION: usize = 2;

/// Decimals shown for the CO2 equivalent
const CO2_PRECISION: usize = 1;

/// Format `value` with `precision` decimals.
///
/// Text that does not fit is replaced by [`OVERFLOW_MARKER`] rather than
/// shown as a misleading prefix.
fn format_value(value: f32, precision: usize) -> String<MAX_VALUE_LEN> {
    let mut text = String::new();
    if write!(text, "{:.*}", precision, value).is_err() {
        text.clear();
        // The marker is shorter than the buffer
        let _ = text.push_str(OVERFLOW_MARKER);
    }
    text
}

/// Draw `value` with its alphabetic baseline at `position`.
pub fn draw_value<D>(
    target: &mut D,
    position: Point,
    value: f32,
    precision: usize,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let text = format_value(value, precision);
    Text::with_baseline(&text, position, style, Baseline::Alphabetic).draw(target)?;
    Ok(())
}

/// Draw the four readings in two rows split at half the display width.
pub fn draw_readings<D>(
    target: &mut D,
    outputs: &SensorOutputs,
    layout: &TextLayout,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let center = (target.size().width / 2) as i32;

    draw_value(
        target,
        Point::new(0, layout.first_row_baseline),
        outputs.iaq,
        DEFAULT_PRECISION,
    )?;
    draw_value(
        target,
        Point::new(center, layout.first_row_baseline),
        outputs.static_iaq,
        DEFAULT_PRECISION,
    )?;

    draw_value(
        target,
        Point::new(0, layout.second_row_baseline),
        outputs.co2_equivalent,
        CO2_PRECISION,
    )?;

    // Small VOC values render one digit shorter; nudge them right
    let voc_offset = if outputs.breath_voc_equivalent <= layout.voc_narrow_threshold {
        layout.voc_narrow_offset
    } else {
        0
    };
    draw_value(
        target,
        Point::new(center + voc_offset, layout.second_row_baseline),
        outputs.breath_voc_equivalent,
        DEFAULT_PRECISION,
    )
}

/// Screen positions of the graph, one per history slot, left to right.
pub fn graph_points<'a>(
    history: &'a HistoryBuffer,
    display_height: u32,
    graph: &'a GraphConfig,
) -> impl Iterator<Item = Point> + 'a {
    history.iter().enumerate().map(move |(column, reading)| {
        let height = if graph.clamp {
            clamped_column_height(reading, display_height, graph.assumed_max)
        } else {
            column_height(reading, display_height, graph.assumed_max)
        };
        Point::new(column as i32, column_row(height, display_height))
    })
}

/// Plot the history, one lit pixel per column.
///
/// Points that fall outside the target are dropped by the target itself.
pub fn draw_graph<D>(
    target: &mut D,
    history: &HistoryBuffer,
    graph: &GraphConfig,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let height = target.size().height;
    let pixels = graph_points(history, height, graph).map(|p| Pixel(p, BinaryColor::On));
    target.draw_iter(pixels)
}
