//! # ESC/POS Printer Commands
//!
//! This module implements the ESC/POS command subset used to drive an Epson
//! TM-T88III class thermal printer over a serial link.
//!
//! ## Protocol Overview
//!
//! ESC/POS commands are short byte sequences starting with a prefix byte:
//!
//! - **ESC** (0x1B): initialization, line spacing, alignment, feed
//! - **GS** (0x1D): character size, raster graphics, cutter
//! - **DC2** (0x12): vendor print-density setting
//!
//! Every builder returns the encoded command as a `Vec<u8>`. Builders clamp
//! out-of-range parameters instead of rejecting them, so a caller can never
//! produce a malformed command.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for character size (`GS !`), raster images (`GS v 0`) and the
/// cutter (`GS V`).
pub const GS: u8 = 0x1D;

/// DC2 - Prefix of the print density command
pub const DC2: u8 = 0x12;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Highest density level accepted by the density command
pub const MAX_DENSITY: u8 = 15;

/// Highest break (heating) time accepted by the density command
pub const MAX_BREAK_TIME: u8 = 7;

/// Smallest line height the printer accepts, in dots
pub const MIN_LINE_HEIGHT: u8 = 24;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## Example
///
/// ```
/// use pressplot::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PRINT QUALITY
// ============================================================================

/// # Set Print Density (DC2 # n)
///
/// Sets heating density and break time in a single byte.
///
/// ## Protocol Details
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | Hex     | 12 23 n     |
///
/// ## Parameters
///
/// - `density`: 0-15, higher is darker (upper nibble of `n`)
/// - `break_time`: 0-7, heating break time (lower bits of `n`)
///
/// Both values are clamped to their range.
///
/// ## Example
///
/// ```
/// use pressplot::protocol::commands;
///
/// // density 8, break time 2 -> 0x82
/// assert_eq!(commands::density(8, 2), vec![0x12, 0x23, 0x82]);
/// ```
pub fn density(density: u8, break_time: u8) -> Vec<u8> {
    let density = density.min(MAX_DENSITY);
    let break_time = break_time.min(MAX_BREAK_TIME);
    vec![DC2, b'#', (density << 4) | break_time]
}

/// # Set Line Spacing (ESC 3 n)
///
/// Sets the line feed amount to `n` dots. Values below 24 are raised to 24,
/// the smallest spacing the mechanism handles without overlapping lines.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC 3 n  |
/// | Hex     | 1B 33 n  |
#[inline]
pub fn line_height(dots: u8) -> Vec<u8> {
    vec![ESC, b'3', dots.max(MIN_LINE_HEIGHT)]
}

// ============================================================================
// TEXT LAYOUT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Justification (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// - `n = 0`: left (default)
/// - `n = 1`: center
/// - `n = 2`: right
///
/// ## Example
///
/// ```
/// use pressplot::protocol::commands::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// # Select Character Size (GS ! n)
///
/// Sets width and height magnification, each 1-8.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS ! n   |
/// | Hex     | 1D 21 n  |
///
/// `n = ((width - 1) << 4) | (height - 1)`
///
/// ## Example
///
/// ```
/// use pressplot::protocol::commands;
///
/// // Double width, double height
/// assert_eq!(commands::font_size(2, 2), vec![0x1D, 0x21, 0x11]);
/// // Out of range values are clamped
/// assert_eq!(commands::font_size(0, 9), vec![0x1D, 0x21, 0x07]);
/// ```
pub fn font_size(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8);
    let h = height.clamp(1, 8);
    vec![GS, b'!', ((w - 1) << 4) | (h - 1)]
}

// ============================================================================
// PAPER HANDLING
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
#[inline]
pub fn feed_lines(lines: u8) -> Vec<u8> {
    vec![ESC, b'd', lines]
}

/// # Full Cut (GS V 0)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
///
/// Printers without an auto-cutter ignore this command.
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0x00]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ## Example
///
/// ```
/// use pressplot::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(1310), [0x1E, 0x05]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_density_packs_nibbles() {
        assert_eq!(density(8, 2), vec![0x12, 0x23, 0x82]);
        assert_eq!(density(0, 0), vec![0x12, 0x23, 0x00]);
        assert_eq!(density(15, 7), vec![0x12, 0x23, 0xF7]);
    }

    #[test]
    fn test_density_clamps() {
        assert_eq!(density(200, 9), vec![0x12, 0x23, 0xF7]);
    }

    #[test]
    fn test_line_height_minimum() {
        assert_eq!(line_height(32), vec![0x1B, 0x33, 32]);
        assert_eq!(line_height(10), vec![0x1B, 0x33, 24]);
    }

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_font_size() {
        assert_eq!(font_size(1, 1), vec![0x1D, 0x21, 0x00]);
        assert_eq!(font_size(8, 8), vec![0x1D, 0x21, 0x77]);
        assert_eq!(font_size(3, 1), vec![0x1D, 0x21, 0x20]);
    }

    #[test]
    fn test_font_size_clamps() {
        assert_eq!(font_size(0, 0), vec![0x1D, 0x21, 0x00]);
        assert_eq!(font_size(12, 12), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_feed_and_cut() {
        assert_eq!(feed_lines(3), vec![0x1B, 0x64, 0x03]);
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
        assert_eq!(u16_le(64), [0x40, 0x00]); // 512 dots wide
    }
}
