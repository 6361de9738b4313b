//! # Monochrome Framebuffer
//!
//! A 1-bit-per-pixel raster laid out exactly the way the printer's raster
//! command expects it, so the buffer can be streamed without conversion.
//!
//! ## Layout
//!
//! ```text
//! byte = x / 8 + y * bytes_per_row
//! bit  = 7 - (x % 8)          (bit 7 = leftmost pixel of the byte)
//! ```
//!
//! A set bit is a black dot. Drawing outside the buffer is a silent no-op,
//! which lets the renderer place labels and thick strokes near the edges
//! without clipping arithmetic of its own.

use crate::error::PressplotError;

use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Dash length of dashed lines, in pixels (equal on and off)
pub const DASH_LENGTH: i32 = 4;

/// Owned 1-bpp raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    bytes_per_row: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate a white framebuffer.
    ///
    /// `width` is rounded down to a multiple of 8: the raster format has no
    /// notion of partial bytes.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::Allocation`] if the backing store cannot be
    /// reserved. Nothing is drawn or sent in that case.
    ///
    /// ## Example
    ///
    /// ```
    /// use pressplot::render::FrameBuffer;
    ///
    /// let fb = FrameBuffer::new(512, 100)?;
    /// assert_eq!(fb.data().len(), 6400);
    /// # Ok::<(), pressplot::error::PressplotError>(())
    /// ```
    pub fn new(width: u16, height: u16) -> Result<Self, PressplotError> {
        let width = width - width % 8;
        let bytes_per_row = width as usize / 8;
        let total = bytes_per_row * height as usize;

        let mut data = Vec::new();
        data.try_reserve_exact(total).map_err(|e| {
            PressplotError::Allocation(format!(
                "{} bytes for a {}x{} framebuffer: {}",
                total, width, height, e
            ))
        })?;
        data.resize(total, 0);

        log::debug!("Allocated {} bytes for {}x{} framebuffer", total, width, height);

        Ok(Self {
            width,
            height,
            bytes_per_row,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// Raw raster payload, row-major, MSB = leftmost pixel.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set every pixel white.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Byte index and mask for an in-bounds pixel.
    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((x / 8 + y * self.bytes_per_row, 0x80 >> (x % 8)))
    }

    /// Paint one pixel black. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if let Some((index, mask)) = self.locate(x, y) {
            self.data[index] |= mask;
        }
    }

    /// Whether a pixel is black. Out-of-range pixels read as white.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .is_some_and(|(index, mask)| self.data[index] & mask != 0)
    }

    /// Number of black pixels.
    pub fn count_black(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Horizontal line over `x_start..x_end` (end exclusive).
    ///
    /// Dashed lines draw 4 pixels on, 4 off, phased on the absolute x
    /// coordinate so that crossing grid lines share a rhythm.
    pub fn draw_horizontal_line(&mut self, y: i32, x_start: i32, x_end: i32, dashed: bool) {
        for x in x_start..x_end {
            if !dashed || is_dash_on(x) {
                self.set_pixel(x, y);
            }
        }
    }

    /// Vertical line over `y_start..y_end` (end exclusive), dashed on y.
    pub fn draw_vertical_line(&mut self, x: i32, y_start: i32, y_end: i32, dashed: bool) {
        for y in y_start..y_end {
            if !dashed || is_dash_on(y) {
                self.set_pixel(x, y);
            }
        }
    }

    /// Fill a `width × height` rectangle with its top-left corner at (x, y).
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        for py in y..y + height {
            for px in x..x + width {
                self.set_pixel(px, py);
            }
        }
    }

    /// Bresenham line from (x0, y0) to (x1, y1), both ends included.
    ///
    /// Every stepped point is stamped with a square covering offsets
    /// `-thickness/2 ..= thickness/2` on both axes. Thickness 0 or 1 draws
    /// single pixels.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: u8) {
        let half = (thickness / 2) as i32;
        let side = 2 * half + 1;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.fill_rect(x - half, y - half, side, side);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw one 5×7 glyph with its top-left corner at (x, y).
    ///
    /// Each glyph bit becomes a `scale × scale` block. When `rotated`, the
    /// glyph is turned 90° clockwise: column `c` moves down to
    /// `y + c*scale` and row `r` lands at `x + (6 - r)*scale`, so the glyph's
    /// top row ends up on the right. Unsupported characters draw nothing.
    pub fn draw_glyph(&mut self, c: char, x: i32, y: i32, scale: u8, rotated: bool) {
        let Some(glyph) = font::glyph(c) else {
            return;
        };
        let s = scale.max(1) as i32;

        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !font::is_set(glyph, col, row) {
                    continue;
                }
                let (px, py) = if rotated {
                    (
                        x + (GLYPH_HEIGHT as i32 - 1 - row as i32) * s,
                        y + col as i32 * s,
                    )
                } else {
                    (x + col as i32 * s, y + row as i32 * s)
                };
                self.fill_rect(px, py, s, s);
            }
        }
    }

    /// Draw a string glyph by glyph.
    ///
    /// Upright text advances right by `(5 + 1) * scale`; rotated text runs
    /// down the page, advancing `(7 + 1) * scale` per character.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: u8, rotated: bool) {
        let advance = text_advance(scale, rotated);
        let mut offset = 0;

        for c in text.chars() {
            if rotated {
                self.draw_glyph(c, x, y + offset, scale, true);
            } else {
                self.draw_glyph(c, x + offset, y, scale, false);
            }
            offset += advance;
        }
    }
}

/// Per-character pen advance for text at `scale`.
#[inline]
pub fn text_advance(scale: u8, rotated: bool) -> i32 {
    let s = scale.max(1) as i32;
    if rotated {
        (GLYPH_HEIGHT as i32 + 1) * s
    } else {
        (GLYPH_WIDTH as i32 + 1) * s
    }
}

/// Length of `text` along its reading direction, in pixels.
pub fn text_extent(text: &str, scale: u8, rotated: bool) -> i32 {
    text.chars().count() as i32 * text_advance(scale, rotated)
}

#[inline]
fn is_dash_on(coord: i32) -> bool {
    (coord / DASH_LENGTH) % 2 == 0
}

// ============================================================================
// TESTS
// ============================================================================
