//! Display boundary
//!
//! The panel driver owns the frame and decides when pixels reach the glass.
//! The core only draws into [`Display::frame`] and calls [`Display::commit`]
//! once per rendered cycle.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::debug;
use thiserror_no_std::Error;

use crate::framebuffer::MonoFrameBuffer;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    #[error("Failed to draw into the frame")]
    Draw,
    #[error("Failed to flush frame to the panel")]
    Flush,
}

/// Pixel-addressable monochrome display with an explicit commit step.
///
/// Clearing, text and single pixels are all drawn through the frame's
/// `DrawTarget` implementation.
pub trait Display {
    type Frame: DrawTarget<Color = BinaryColor> + OriginDimensions;

    /// Frame that the next commit will show.
    fn frame(&mut self) -> &mut Self::Frame;

    /// Push the frame to the physical panel.
    fn commit(&mut self) -> Result<(), DisplayError>;
}

/// [`Display`] that draws into a [`MonoFrameBuffer`] and flushes only the
/// changed region to a downstream panel on commit.
pub struct BufferedDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    frame: MonoFrameBuffer,
    panel: D,
    commits: u32,
}

impl<D> BufferedDisplay<D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    /// Wrap `panel`, sizing the framebuffer to match it.
    pub fn new(panel: D) -> Self {
        let size = panel.size();
        Self {
            frame: MonoFrameBuffer::new(size.width, size.height),
            panel,
            commits: 0,
        }
    }
}

impl<D> BufferedDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    /// The downstream panel, as of the last commit.
    pub fn panel(&self) -> &D {
        &self.panel
    }

    /// Number of successful commits so far.
    pub fn commits(&self) -> u32 {
        self.commits
    }
}

impl<D> Display for BufferedDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: core::fmt::Debug,
{
    type Frame = MonoFrameBuffer;

    fn frame(&mut self) -> &mut MonoFrameBuffer {
        &mut self.frame
    }

    fn commit(&mut self) -> Result<(), DisplayError> {
        self.frame.flush(&mut self.panel).map_err(|e| {
            debug!("Panel flush failed: {:?}", e);
            DisplayError::Flush
        })?;
        self.commits = self.commits.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn test_frame_matches_panel_size() {
        let mut display = BufferedDisplay::new(MonoFrameBuffer::new(32, 16));
        assert_eq!(display.frame().size(), Size::new(32, 16));
        assert_eq!(display.commits(), 0);
    }

    #[test]
    fn test_commit_flushes_to_panel() {
        let mut display = BufferedDisplay::new(MonoFrameBuffer::new(8, 8));
        display
            .frame()
            .fill_solid(
                &Rectangle::new(Point::new(0, 0), Size::new(2, 2)),
                BinaryColor::On,
            )
            .unwrap();

        assert_eq!(display.panel().lit_pixels(), 0);
        display.commit().unwrap();
        assert_eq!(display.panel().lit_pixels(), 4);
        assert_eq!(display.commits(), 1);
    }
}
