//! # ESC/POS Raster Graphics
//!
//! This module implements the raster bit image command (`GS v 0`).
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! Rows are sent top to bottom, each row `width / 8` bytes long, so the
//! payload is exactly `(width / 8) * height` bytes.
//!
//! ## Streaming
//!
//! Unlike the other commands, the header and the payload are written
//! separately: the header first, then the payload in bounded chunks (see
//! [`crate::printer::PrinterDriver::print_bitmap`]). This keeps the largest
//! single write small enough for a UART transmit buffer.

use super::commands::{GS, u16_le};

/// Length of the raster command header in bytes
pub const RASTER_HEADER_LEN: usize = 8;

/// Raster mode byte: normal density (no double width/height)
pub const RASTER_MODE_NORMAL: u8 = 0x00;

/// # Print Raster Bit Image Header (GS v 0 m xL xH yL yH)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Mode (0 = normal)
/// - `xL, xH`: Width in **bytes**, little-endian
/// - `yL, yH`: Height in dots, little-endian
///
/// The width is given in dots and divided by 8 (remainder dropped, as the
/// raster contract requires a multiple of 8).
///
/// ## Example
///
/// ```
/// use pressplot::protocol::graphics;
///
/// let header = graphics::raster_header(512, 1310);
/// assert_eq!(header, vec![0x1D, 0x76, 0x30, 0x00, 64, 0, 0x1E, 0x05]);
/// ```
pub fn raster_header(width_dots: u16, height: u16) -> Vec<u8> {
    let [xl, xh] = u16_le(width_dots / 8);
    let [yl, yh] = u16_le(height);
    vec![GS, b'v', b'0', RASTER_MODE_NORMAL, xl, xh, yl, yh]
}

/// Expected payload size for a raster image of the given dimensions.
#[inline]
pub fn raster_payload_len(width_dots: u16, height: u16) -> usize {
    (width_dots / 8) as usize * height as usize
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_header() {
        let cmd = raster_header(512, 100);

        assert_eq!(cmd.len(), RASTER_HEADER_LEN);
        assert_eq!(cmd[0], 0x1D); // GS
        assert_eq!(cmd[1], 0x76); // 'v'
        assert_eq!(cmd[2], 0x30); // '0'
        assert_eq!(cmd[3], 0x00); // normal mode
        assert_eq!(cmd[4], 64); // xL (512/8 = 64)
        assert_eq!(cmd[5], 0); // xH
        assert_eq!(cmd[6], 100); // yL
        assert_eq!(cmd[7], 0); // yH
    }

    #[test]
    fn test_raster_header_large_height() {
        // 500 = 0x01F4 -> [0xF4, 0x01] in little-endian
        let cmd = raster_header(512, 500);
        assert_eq!(cmd[6], 0xF4);
        assert_eq!(cmd[7], 0x01);
    }

    #[test]
    fn test_raster_header_drops_partial_byte() {
        let cmd = raster_header(515, 10);
        assert_eq!(cmd[4], 64);
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(raster_payload_len(512, 100), 6400);
        assert_eq!(raster_payload_len(8, 1), 1);
    }
}
