//! # Command Channel Packets
//!
//! Frames exchanged with whatever decides *when* to print (a host PC, a
//! panel controller). They share the serial discipline of the printer link
//! but travel on a separate port.
//!
//! ## Frame Format
//!
//! ```text
//! ┌──────┬─────────┬────────┬──────────────┬──────────┐
//! │ 0xAA │ command │ length │ payload[len] │ checksum │
//! └──────┴─────────┴────────┴──────────────┴──────────┘
//!   1 B     1 B       1 B      0-32 B         1 B
//! ```
//!
//! `checksum = 0xAA ^ command ^ length ^ payload[0] ^ ... ^ payload[len-1]`
//!
//! A frame with a bad checksum is discarded; the sender is not notified.
//! A receiver gives up on a frame that does not complete within
//! [`PACKET_TIMEOUT`].

use std::time::{Duration, Instant};

use crate::error::PressplotError;
use crate::transport::Transport;

/// Frame synchronization byte
pub const PACKET_HEADER: u8 = 0xAA;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD: usize = 32;

/// Bytes around the payload (header, command, length, checksum)
pub const FRAME_OVERHEAD: usize = 4;

/// How long a receiver waits for a complete frame
pub const PACKET_TIMEOUT: Duration = Duration::from_millis(1000);

/// A command channel packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub command: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Create a packet, rejecting payloads over [`MAX_PAYLOAD`] bytes.
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, PressplotError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(PressplotError::InvalidPacket(format!(
                "payload of {} bytes exceeds {} byte limit",
                payload.len(),
                MAX_PAYLOAD
            )));
        }
        Ok(Self {
            command,
            payload: payload.to_vec(),
        })
    }

    /// Packet without payload
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            payload: Vec::new(),
        }
    }

    /// Encode to wire bytes.
    ///
    /// ## Example
    ///
    /// ```
    /// use pressplot::protocol::packet::Packet;
    ///
    /// let bytes = Packet::new(0x01, &[0x02])?.encode();
    /// // 0xAA ^ 0x01 ^ 0x01 ^ 0x02 = 0xA8
    /// assert_eq!(bytes, vec![0xAA, 0x01, 0x01, 0x02, 0xA8]);
    /// # Ok::<(), pressplot::error::PressplotError>(())
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len() as u8;
        let mut frame = Vec::with_capacity(FRAME_OVERHEAD + self.payload.len());
        frame.push(PACKET_HEADER);
        frame.push(self.command);
        frame.push(len);
        frame.extend_from_slice(&self.payload);
        frame.push(checksum(self.command, &self.payload));
        frame
    }

    /// Decode one complete frame.
    pub fn decode(frame: &[u8]) -> Result<Self, PressplotError> {
        if frame.len() < FRAME_OVERHEAD {
            return Err(PressplotError::InvalidPacket(format!(
                "frame of {} bytes is shorter than {}",
                frame.len(),
                FRAME_OVERHEAD
            )));
        }
        if frame[0] != PACKET_HEADER {
            return Err(PressplotError::InvalidPacket(format!(
                "bad header byte {:#04x}",
                frame[0]
            )));
        }

        let len = frame[2] as usize;
        if len > MAX_PAYLOAD || frame.len() != FRAME_OVERHEAD + len {
            return Err(PressplotError::InvalidPacket(format!(
                "length byte {} does not match frame of {} bytes",
                len,
                frame.len()
            )));
        }

        let command = frame[1];
        let payload = &frame[3..3 + len];
        let expected = checksum(command, payload);
        let actual = frame[3 + len];
        if expected != actual {
            return Err(PressplotError::ChecksumMismatch { expected, actual });
        }

        Ok(Self {
            command,
            payload: payload.to_vec(),
        })
    }
}

/// XOR checksum over header, command, length and payload.
pub fn checksum(command: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(PACKET_HEADER ^ command ^ payload.len() as u8, |acc, b| acc ^ b)
}

// ============================================================================
// STREAM PARSER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    WaitingForHeader,
    WaitingForCommand,
    WaitingForLength,
    ReadingPayload,
    WaitingForChecksum,
}

/// Byte-at-a-time frame parser
#[derive(Debug, Clone)]
pub struct PacketParser {
    state: ParseState,
    command: u8,
    expected_len: usize,
    payload: Vec<u8>,
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            command: 0,
            expected_len: 0,
            payload: Vec::with_capacity(MAX_PAYLOAD),
        }
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.command = 0;
        self.expected_len = 0;
        self.payload.clear();
    }

    /// Whether a frame has started but not completed.
    pub fn in_frame(&self) -> bool {
        self.state != ParseState::WaitingForHeader
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(packet))` when a frame completes, `Ok(None)` when more
    /// bytes are needed, or an error when the frame is discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Packet>, PressplotError> {
        match self.state {
            ParseState::WaitingForHeader => {
                // Line noise between frames is skipped
                if byte == PACKET_HEADER {
                    self.state = ParseState::WaitingForCommand;
                }
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                self.command = byte;
                self.state = ParseState::WaitingForLength;
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte as usize > MAX_PAYLOAD {
                    self.reset();
                    return Err(PressplotError::InvalidPacket(format!(
                        "length byte {} exceeds {}",
                        byte, MAX_PAYLOAD
                    )));
                }
                self.expected_len = byte as usize;
                self.payload.clear();
                self.state = if self.expected_len == 0 {
                    ParseState::WaitingForChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                self.payload.push(byte);
                if self.payload.len() == self.expected_len {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected = checksum(self.command, &self.payload);
                if byte != expected {
                    self.reset();
                    return Err(PressplotError::ChecksumMismatch {
                        expected,
                        actual: byte,
                    });
                }

                let packet = Packet {
                    command: self.command,
                    payload: std::mem::take(&mut self.payload),
                };
                self.reset();
                Ok(Some(packet))
            }
        }
    }
}

/// Wait for one valid packet on `transport`.
///
/// Bad frames are logged and discarded, then waiting continues. Returns
/// `Ok(None)` when `timeout` elapses first; a partial frame is dropped at
/// that point.
pub fn receive<T: Transport + ?Sized>(
    transport: &mut T,
    parser: &mut PacketParser,
    timeout: Duration,
) -> Result<Option<Packet>, PressplotError> {
    let deadline = Instant::now() + timeout;
    let mut byte = [0u8; 1];

    loop {
        if transport.read(&mut byte)? == 1 {
            match parser.feed(byte[0]) {
                Ok(Some(packet)) => return Ok(Some(packet)),
                Ok(None) => {}
                Err(e) => log::warn!("Discarding inbound packet: {}", e),
            }
        } else if Instant::now() >= deadline {
            if parser.in_frame() {
                log::warn!("Timed out waiting for the rest of a packet");
                parser.reset();
            }
            return Ok(None);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn feed_all(parser: &mut PacketParser, bytes: &[u8]) -> Result<Option<Packet>, PressplotError> {
        for &b in bytes {
            if let Some(p) = parser.feed(b)? {
                return Ok(Some(p));
            }
        }
        Ok(None)
    }

    #[test]
    fn test_checksum_is_xor_of_all_fields() {
        let payload = [0x10, 0x20, 0x30];
        let expected = 0xAA ^ 0x05 ^ 0x03 ^ 0x10 ^ 0x20 ^ 0x30;
        assert_eq!(checksum(0x05, &payload), expected);
    }

    #[test]
    fn test_encode_empty_payload() {
        let bytes = Packet::empty(0x02).encode();
        assert_eq!(bytes, vec![0xAA, 0x02, 0x00, 0xAA ^ 0x02]);
    }

    #[test]
    fn test_payload_too_large() {
        assert!(Packet::new(0x01, &[0u8; 32]).is_ok());
        assert!(matches!(
            Packet::new(0x01, &[0u8; 33]),
            Err(PressplotError::InvalidPacket(_))
        ));
    }

    #[test]
    fn test_decode_valid_frame() {
        let packet = Packet::new(0x01, &[1, 2, 3]).unwrap();
        let decoded = Packet::decode(&packet.encode()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_any_single_corrupted_byte_fails() {
        let frame = Packet::new(0x01, &[0x02, 0x07, 0x40, 0x9C]).unwrap().encode();

        for i in 0..frame.len() {
            for flip in [0x01u8, 0x80, 0xFF] {
                let mut corrupted = frame.clone();
                corrupted[i] ^= flip;
                assert!(
                    Packet::decode(&corrupted).is_err(),
                    "corrupting byte {} with {:#04x} went undetected",
                    i,
                    flip
                );
            }
        }
    }

    #[test]
    fn test_decode_reports_checksum_mismatch() {
        let mut frame = Packet::new(0x01, &[0x02]).unwrap().encode();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        assert!(matches!(
            Packet::decode(&frame),
            Err(PressplotError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_parser_skips_noise_before_header() {
        let mut parser = PacketParser::new();
        let mut bytes = vec![0x00, 0x13, 0x55];
        bytes.extend(Packet::new(0x03, &[9]).unwrap().encode());

        let packet = feed_all(&mut parser, &bytes).unwrap().unwrap();
        assert_eq!(packet.command, 0x03);
        assert_eq!(packet.payload, vec![9]);
        assert!(!parser.in_frame());
    }

    #[test]
    fn test_parser_rejects_bad_checksum_then_recovers() {
        let mut parser = PacketParser::new();
        let mut bad = Packet::new(0x01, &[5]).unwrap().encode();
        let last = bad.len() - 1;
        bad[last] ^= 0x10;

        assert!(matches!(
            feed_all(&mut parser, &bad),
            Err(PressplotError::ChecksumMismatch { .. })
        ));

        let good = Packet::new(0x01, &[5]).unwrap().encode();
        assert_eq!(feed_all(&mut parser, &good).unwrap().unwrap().payload, vec![5]);
    }

    #[test]
    fn test_parser_rejects_oversized_length() {
        let mut parser = PacketParser::new();
        assert!(matches!(
            feed_all(&mut parser, &[0xAA, 0x01, 33]),
            Err(PressplotError::InvalidPacket(_))
        ));
        assert!(!parser.in_frame());
    }

    #[test]
    fn test_receive_returns_packet() {
        let mut transport = MockTransport::new();
        transport.push_inbound(&Packet::empty(0x02).encode());

        let mut parser = PacketParser::new();
        let packet = receive(&mut transport, &mut parser, Duration::from_millis(50))
            .unwrap()
            .unwrap();
        assert_eq!(packet.command, 0x02);
    }

    #[test]
    fn test_receive_skips_corrupt_frame() {
        let mut transport = MockTransport::new();
        let mut bad = Packet::empty(0x02).encode();
        bad[3] ^= 0xFF;
        transport.push_inbound(&bad);
        transport.push_inbound(&Packet::empty(0x03).encode());

        let mut parser = PacketParser::new();
        let packet = receive(&mut transport, &mut parser, Duration::from_millis(50))
            .unwrap()
            .unwrap();
        assert_eq!(packet.command, 0x03);
    }

    #[test]
    fn test_receive_times_out_on_partial_frame() {
        let mut transport = MockTransport::new();
        transport.push_inbound(&[0xAA, 0x01, 0x04, 0x00]);

        let mut parser = PacketParser::new();
        let result = receive(&mut transport, &mut parser, Duration::from_millis(20)).unwrap();
        assert!(result.is_none());
        assert!(!parser.in_frame());
    }
}
