//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS dialect
//! spoken by Epson TM-T88III class thermal printers, plus the packet framing
//! of the command channel.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, density, alignment, size, feed, cut)
//! - [`graphics`]: Raster bit image header
//! - [`packet`]: `0xAA`-framed command channel packets with XOR checksum
//!
//! ## Usage Example
//!
//! ```
//! use pressplot::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::align(commands::Alignment::Center));
//! data.extend(b"BUILD-UP\n");
//!
//! // 64 bytes wide, 24 rows of vertical stripes
//! data.extend(graphics::raster_header(512, 24));
//! data.extend(vec![0xAA; 64 * 24]);
//!
//! data.extend(commands::feed_lines(3));
//! data.extend(commands::cut_full());
//! ```

pub mod commands;
pub mod graphics;
pub mod packet;
