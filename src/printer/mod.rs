//! # Printer Module
//!
//! Printer hardware profile, pacing constants and the protocol driver.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications and command pacing
//! - [`driver`]: ESC/POS driver state machine and chunked raster transfer

pub mod config;
pub mod driver;

pub use config::{PrinterConfig, Timing};
pub use driver::{DriverState, PrinterDriver, TransferReport};
