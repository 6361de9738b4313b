//! # Printer Configuration
//!
//! Hardware profile and pacing constants for the supported printer.
//!
//! ## Supported Printers
//!
//! | Model | Width (dots) | Resolution | Chunk |
//! |-------|--------------|------------|-------|
//! | TM-T88III | 512 | 180 DPI | 512 bytes |
//!
//! ## Usage
//!
//! ```
//! use pressplot::printer::PrinterConfig;
//!
//! let config = PrinterConfig::TM_T88III;
//! println!("Print width: {} dots ({} bytes)",
//!          config.width_dots,
//!          config.width_bytes);
//! ```

use std::time::Duration;

/// # Printer Configuration
///
/// Defines the hardware characteristics of a thermal printer.
///
/// ## Physical Properties
///
/// - **width_dots**: Raster width in dots (pixels)
/// - **width_bytes**: Width in bytes (width_dots / 8)
/// - **dpi**: Resolution in dots per inch
///
/// ## Serial Tuning
///
/// - **chunk_size**: Bytes per raster write; kept small so the receive
///   buffer of the printer never overruns
/// - **max_chunk_retries**: Extra attempts for the unsent remainder of a
///   short chunk write
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// paper_mm = raster_rows / dots_per_mm
///
/// For TM-T88III:
///   dots_per_mm = 180 / 25.4 ≈ 7.09
///   1310 rows / 7.09 ≈ 185mm of paper per graph
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Raster width in dots (pixels)
    pub width_dots: u16,

    /// Raster width in bytes (width_dots / 8)
    pub width_bytes: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Bytes per raster payload write
    pub chunk_size: usize,

    /// Extra attempts for the remainder of a short chunk write
    pub max_chunk_retries: u8,
}

impl PrinterConfig {
    /// # Epson TM-T88III Configuration
    ///
    /// 80mm paper, ESC/POS over RS-232.
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Paper width | 80mm |
    /// | Raster width | 512 dots |
    /// | Resolution | 180 DPI |
    /// | Interface | Serial |
    /// | Cutter | Auto-cutter |
    pub const TM_T88III: Self = Self {
        name: "Epson TM-T88III",
        width_dots: 512,
        width_bytes: 64,
        dpi: 180,
        chunk_size: 512,
        max_chunk_retries: 2,
    };

    /// Calculate dots per millimeter
    ///
    /// ```
    /// use pressplot::printer::PrinterConfig;
    ///
    /// let config = PrinterConfig::TM_T88III;
    /// assert!((config.dots_per_mm() - 7.09).abs() < 0.01);
    /// ```
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Paper advanced by `dots` raster rows.
    #[inline]
    pub fn dots_to_mm(&self, dots: u16) -> f32 {
        dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::TM_T88III
    }
}

// ============================================================================
// PACING
// ============================================================================

/// Pause after each command, standing in for hardware flow control.
///
/// The values are empirical: long enough for the printer to digest a
/// command before the next one arrives over a 19200 baud link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Before the first reset, and after it
    pub init_settle: Duration,
    /// After the second (set-default) reset
    pub defaults: Duration,
    pub density: Duration,
    pub line_height: Duration,
    /// Alignment and font size
    pub style: Duration,
    pub text_line: Duration,
    pub raster_header: Duration,
    pub chunk: Duration,
    pub post_bitmap: Duration,
    /// Per fed line
    pub feed_per_line: Duration,
    pub cut: Duration,
}

impl Timing {
    pub const REFERENCE: Self = Self {
        init_settle: Duration::from_millis(500),
        defaults: Duration::from_millis(300),
        density: Duration::from_millis(100),
        line_height: Duration::from_millis(10),
        style: Duration::from_millis(50),
        text_line: Duration::from_millis(10),
        raster_header: Duration::from_millis(20),
        chunk: Duration::from_millis(10),
        post_bitmap: Duration::from_millis(50),
        feed_per_line: Duration::from_millis(50),
        cut: Duration::from_millis(500),
    };

    /// No pauses at all, for tests and dry runs.
    pub const fn immediate() -> Self {
        Self {
            init_settle: Duration::ZERO,
            defaults: Duration::ZERO,
            density: Duration::ZERO,
            line_height: Duration::ZERO,
            style: Duration::ZERO,
            text_line: Duration::ZERO,
            raster_header: Duration::ZERO,
            chunk: Duration::ZERO,
            post_bitmap: Duration::ZERO,
            feed_per_line: Duration::ZERO,
            cut: Duration::ZERO,
        }
    }

    /// Pause after feeding `lines` lines.
    #[inline]
    pub fn feed(&self, lines: u8) -> Duration {
        self.feed_per_line * lines as u32
    }

    /// Lower bound of the time spent pausing while streaming `payload_len`
    /// bytes in chunks of `chunk_size`.
    pub fn bitmap_estimate(&self, payload_len: usize, chunk_size: usize) -> Duration {
        let chunks = payload_len.div_ceil(chunk_size.max(1)) as u32;
        self.raster_header + self.chunk * chunks + self.post_bitmap
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::REFERENCE
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tm_t88iii_dimensions() {
        let config = PrinterConfig::TM_T88III;
        assert_eq!(config.width_dots, 512);
        assert_eq!(config.width_bytes, 64);
        assert_eq!(config.width_dots, config.width_bytes * 8);
        assert_eq!(config.chunk_size, 512);
    }

    #[test]
    fn test_graph_paper_length() {
        let config = PrinterConfig::TM_T88III;
        // 1310 rows / 7.09 dpmm ≈ 185mm
        assert!((config.dots_to_mm(1310) - 184.9).abs() < 0.5);
    }

    #[test]
    fn test_default_is_tm_t88iii() {
        assert_eq!(PrinterConfig::default(), PrinterConfig::TM_T88III);
        assert_eq!(Timing::default(), Timing::REFERENCE);
    }

    #[test]
    fn test_feed_scales_with_lines() {
        assert_eq!(Timing::REFERENCE.feed(3), Duration::from_millis(150));
        assert_eq!(Timing::immediate().feed(3), Duration::ZERO);
    }

    #[test]
    fn test_bitmap_estimate() {
        // 13 chunks: 20 + 13 * 10 + 50
        assert_eq!(
            Timing::REFERENCE.bitmap_estimate(6400, 512),
            Duration::from_millis(200)
        );
    }
}
