//! # Printer Transport Layer
//!
//! This module provides the byte-stream backends the printer driver and the
//! command inbox talk to.
//!
//! ## Available Transports
//!
//! - [`serial`]: raw tty (USB-serial adapter, UART) for the printer and the
//!   command port
//! - [`mock`]: in-memory transport that records writes, for tests and dry runs
//!
//! ## Contract
//!
//! A transport is a duplex channel that is reliable but rate-limited. It has
//! no flow control of its own: the driver paces its writes. A `write` may
//! accept fewer bytes than offered; callers decide whether that is fatal.

pub mod mock;
pub mod serial;

pub use mock::MockTransport;
pub use serial::{PortInfo, SerialTransport};

use crate::error::PressplotError;

/// Duplex byte channel to a printer or a command source.
pub trait Transport {
    /// Write bytes, returning how many the channel accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, PressplotError>;

    /// Block until everything written so far has left the transmit buffer.
    fn flush(&mut self) -> Result<(), PressplotError>;

    /// Drop any inbound bytes that have not been read yet.
    fn discard_input(&mut self) -> Result<(), PressplotError>;

    /// Read available bytes into `buf`. Returns 0 when the read timed out.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PressplotError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<usize, PressplotError> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<(), PressplotError> {
        (**self).flush()
    }

    fn discard_input(&mut self) -> Result<(), PressplotError> {
        (**self).discard_input()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PressplotError> {
        (**self).read(buf)
    }
}
