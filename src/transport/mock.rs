//! # In-Memory Transport
//!
//! Records every write as a separate entry so tests can assert on command
//! boundaries and chunk counts, not just the concatenated byte stream.

use std::collections::VecDeque;

use crate::error::PressplotError;

use super::Transport;

/// Transport that keeps everything in memory.
///
/// ## Example
///
/// ```
/// use pressplot::transport::{MockTransport, Transport};
///
/// let mut transport = MockTransport::new();
/// transport.write(&[0x1B, 0x40])?;
/// assert_eq!(transport.writes(), &[vec![0x1B, 0x40]]);
///
/// # Ok::<(), pressplot::error::PressplotError>(())
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    writes: Vec<Vec<u8>>,
    inbound: VecDeque<u8>,
    write_limit: Option<usize>,
    flushes: usize,
    discards: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `limit` bytes per write, simulating a congested link.
    pub fn with_write_limit(limit: usize) -> Self {
        Self {
            write_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Queue bytes to be returned by `read`.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Every accepted write, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All accepted bytes concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn discard_count(&self) -> usize {
        self.discards
    }

    /// Inbound bytes not read yet.
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, PressplotError> {
        let accepted = match self.write_limit {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };
        self.writes.push(data[..accepted].to_vec());
        Ok(accepted)
    }

    fn flush(&mut self) -> Result<(), PressplotError> {
        self.flushes += 1;
        Ok(())
    }

    fn discard_input(&mut self) -> Result<(), PressplotError> {
        self.discards += 1;
        self.inbound.clear();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PressplotError> {
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}
