//! Heap-backed monochrome framebuffer with per-pixel change detection.
//!
//! The sample loop draws into this RAM buffer instead of the panel. On
//! commit, only the rectangular region containing changed pixels is pushed
//! to the downstream display in a single `fill_contiguous` call.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Monochrome framebuffer implementing `DrawTarget<Color = BinaryColor>`.
///
/// One byte per pixel; a 128x64 panel costs 8 KiB. Pixels outside the
/// buffer are silently dropped, which is what makes unclamped graph values
/// disappear off the top edge instead of wrapping.
pub struct MonoFrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<BinaryColor>,
    dirty: Option<DirtyRect>,
}

impl MonoFrameBuffer {
    /// Allocate a framebuffer of `width` x `height` pixels, all off.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as usize;
        let height = height as usize;
        Self {
            width,
            height,
            pixels: vec![BinaryColor::Off; width * height],
            dirty: None,
        }
    }

    /// Color of the pixel at (`x`, `y`), or `None` if outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Number of lit pixels in the whole buffer.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_on()).count()
    }

    /// Region that the next flush would send, if any pixel changed.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: BinaryColor) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Flush the dirty region to a downstream display, then reset the dirty state.
    ///
    /// If nothing changed since the last flush this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let area = rect.to_rectangle();
        let width = area.size.width as usize;

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for MonoFrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for MonoFrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if self.index(coord.x, coord.y).is_some() {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_clean_and_dark() {
        let fb = MonoFrameBuffer::new(16, 8);
        assert_eq!(fb.size(), Size::new(16, 8));
        assert_eq!(fb.lit_pixels(), 0);
        assert_eq!(fb.dirty_area(), None);
    }

    #[test]
    fn test_out_of_bounds_pixels_dropped() {
        let mut fb = MonoFrameBuffer::new(4, 4);
        let pixels = [
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(0, 4), BinaryColor::On),
            Pixel(Point::new(4, 0), BinaryColor::On),
            Pixel(Point::new(2, -16), BinaryColor::On),
        ];
        fb.draw_iter(pixels).unwrap();
        assert_eq!(fb.lit_pixels(), 0);
        assert_eq!(fb.dirty_area(), None);
    }

    #[test]
    fn test_dirty_rect_tracks_changes() {
        let mut fb = MonoFrameBuffer::new(16, 8);
        fb.draw_iter([
            Pixel(Point::new(2, 1), BinaryColor::On),
            Pixel(Point::new(5, 6), BinaryColor::On),
        ])
        .unwrap();

        assert_eq!(fb.pixel(2, 1), Some(BinaryColor::On));
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(2, 1), Size::new(4, 6)))
        );
    }

    #[test]
    fn test_redrawing_same_color_is_not_dirty() {
        let mut fb = MonoFrameBuffer::new(8, 8);
        fb.clear(BinaryColor::Off).unwrap();
        assert_eq!(fb.dirty_area(), None);
    }

    #[test]
    fn test_flush_copies_dirty_region_and_resets() {
        let mut fb = MonoFrameBuffer::new(8, 8);
        let mut panel = MonoFrameBuffer::new(8, 8);

        fb.fill_solid(
            &Rectangle::new(Point::new(1, 2), Size::new(3, 2)),
            BinaryColor::On,
        )
        .unwrap();
        fb.flush(&mut panel).unwrap();

        assert_eq!(fb.dirty_area(), None);
        assert_eq!(panel.lit_pixels(), 6);
        assert_eq!(panel.pixel(3, 3), Some(BinaryColor::On));
        assert_eq!(panel.pixel(4, 3), Some(BinaryColor::Off));
    }

    #[test]
    fn test_fill_solid_clips_to_bounds() {
        let mut fb = MonoFrameBuffer::new(4, 4);
        fb.fill_solid(
            &Rectangle::new(Point::new(2, 2), Size::new(10, 10)),
            BinaryColor::On,
        )
        .unwrap();
        assert_eq!(fb.lit_pixels(), 4);
    }
}
