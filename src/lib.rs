//! # Pressplot - Build-up Curve Printing
//!
//! Pressplot renders a pressure "build-up curve" graph into a 1-bit raster
//! and prints it on an ESC/POS thermal printer over a serial link. It
//! provides:
//!
//! - **Rendering**: bit-packed framebuffer, 5×7 labels, grid and curve
//! - **Curve synthesis**: deterministic build-up series with bounded noise
//! - **Reduction**: peak-preserving downsampling and smoothing
//! - **Protocol**: ESC/POS command builders and `0xAA` command packets
//! - **Driver**: paced, chunked raster transfer over any transport
//! - **Dispatch**: bounded job queue, shared status and a command inbox
//!
//! ## Quick Start
//!
//! ```no_run
//! use pressplot::{
//!     dispatch::StatusCell,
//!     job::{GraphJob, PrintSettings},
//!     printer::{PrinterConfig, PrinterDriver, Timing},
//!     render::{CurvePattern, GraphLayout},
//!     transport::SerialTransport,
//! };
//!
//! // Open the printer port
//! let transport = SerialTransport::open("/dev/ttyUSB0", 19200)?;
//! let mut driver = PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::default());
//!
//! // One quadratic build-up graph, seed 42
//! let job = GraphJob::new(CurvePattern::Quadratic, 42);
//! let report = job.run(
//!     &mut driver,
//!     &GraphLayout::REFERENCE,
//!     &PrintSettings::default(),
//!     &StatusCell::new(),
//! )?;
//!
//! println!("Sent {} bytes in {} chunks", report.bytes_sent, report.chunks);
//! # Ok::<(), pressplot::error::PressplotError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | Framebuffer, curve synthesis, reduction, graph drawing |
//! | [`protocol`] | ESC/POS command builders, command packets |
//! | [`printer`] | Printer profile, pacing, protocol driver |
//! | [`transport`] | Serial and in-memory backends |
//! | [`job`] | One print job end to end |
//! | [`dispatch`] | Job queue, status and command inbox |
//! | [`config`] | JSON configuration |
//! | [`diagnostic`] | Connection test page |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Epson TM-T88III (80mm paper, 512-dot raster, serial). Other ESC/POS
//! printers that accept `GS v 0` should work with an adjusted
//! [`PrinterConfig`].

pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use error::PressplotError;
pub use printer::{PrinterConfig, PrinterDriver};
pub use transport::{MockTransport, SerialTransport};
