//! # Command Inbox
//!
//! Reads `0xAA` packets from the command port, turns PRINT requests into
//! queued jobs and answers STATUS and PING.
//!
//! ## Commands
//!
//! | Command | Byte | Payload | Reply |
//! |---------|------|---------|-------|
//! | PRINT | `0x01` | pattern, [thickness], [seed u32 LE] | `0x81` + accepted (1) / rejected (0) |
//! | STATUS | `0x02` | - | `0x82` + phase byte |
//! | PING | `0x03` | - | `0x83` |
//!
//! Unknown commands and malformed payloads are logged and ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::JobDefaults;
use crate::error::PressplotError;
use crate::job::GraphJob;
use crate::protocol::packet::{self, Packet, PacketParser};
use crate::render::CurvePattern;
use crate::transport::Transport;

use super::queue::JobQueue;
use super::status::StatusCell;

pub const CMD_PRINT: u8 = 0x01;
pub const CMD_STATUS: u8 = 0x02;
pub const CMD_PING: u8 = 0x03;

/// Set on the command byte of every reply
pub const REPLY_FLAG: u8 = 0x80;

/// A PRINT request; absent fields fall back to the configured defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintRequest {
    pub pattern: CurvePattern,
    pub thickness: Option<u8>,
    pub seed: Option<u32>,
}

impl PrintRequest {
    fn parse(payload: &[u8]) -> Result<Self, PressplotError> {
        let (&pattern, rest) = payload.split_first().ok_or_else(|| {
            PressplotError::InvalidPacket("PRINT without a pattern byte".into())
        })?;
        let pattern = CurvePattern::try_from(pattern)?;

        let (thickness, seed) = match rest {
            [] => (None, None),
            [t] => (Some(*t), None),
            [t, a, b, c, d] => (Some(*t), Some(u32::from_le_bytes([*a, *b, *c, *d]))),
            _ => {
                return Err(PressplotError::InvalidPacket(format!(
                    "PRINT payload of {} bytes (expected 1, 2 or 6)",
                    payload.len()
                )));
            }
        };

        Ok(Self {
            pattern,
            thickness,
            seed,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut payload = vec![self.pattern as u8];
        match (self.thickness, self.seed) {
            (None, None) => {}
            (Some(t), None) => payload.push(t),
            (t, Some(seed)) => {
                payload.push(t.unwrap_or(crate::job::DEFAULT_THICKNESS));
                payload.extend_from_slice(&seed.to_le_bytes());
            }
        }
        payload
    }
}

/// Decoded inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxCommand {
    Print(PrintRequest),
    Status,
    Ping,
}

impl InboxCommand {
    pub fn parse(packet: &Packet) -> Result<Self, PressplotError> {
        match packet.command {
            CMD_PRINT => Ok(InboxCommand::Print(PrintRequest::parse(&packet.payload)?)),
            CMD_STATUS => Ok(InboxCommand::Status),
            CMD_PING => Ok(InboxCommand::Ping),
            other => Err(PressplotError::InvalidPacket(format!(
                "unknown command {:#04x}",
                other
            ))),
        }
    }

    /// The packet a host sends for this command.
    pub fn to_packet(&self) -> Packet {
        match self {
            InboxCommand::Print(request) => Packet {
                command: CMD_PRINT,
                payload: request.encode(),
            },
            InboxCommand::Status => Packet::empty(CMD_STATUS),
            InboxCommand::Ping => Packet::empty(CMD_PING),
        }
    }
}

/// Source of seeds for requests that do not carry one
pub type SeedSource = Box<dyn FnMut() -> u32 + Send>;

/// Command port reader.
pub struct Inbox<T: Transport> {
    transport: T,
    parser: PacketParser,
    queue: JobQueue,
    status: StatusCell,
    defaults: JobDefaults,
    seed_source: SeedSource,
}

impl<T: Transport> Inbox<T> {
    pub fn new(
        transport: T,
        queue: JobQueue,
        status: StatusCell,
        defaults: JobDefaults,
        seed_source: SeedSource,
    ) -> Self {
        Self {
            transport,
            parser: PacketParser::new(),
            queue,
            status,
            defaults,
            seed_source,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Wait up to `timeout` for one packet and act on it.
    ///
    /// Returns the command handled, or `None` on timeout or for an ignored
    /// packet. Only transport failures are errors.
    pub fn poll(&mut self, timeout: Duration) -> Result<Option<InboxCommand>, PressplotError> {
        let Some(packet) = packet::receive(&mut self.transport, &mut self.parser, timeout)? else {
            return Ok(None);
        };

        let command = match InboxCommand::parse(&packet) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("Ignoring command packet: {}", e);
                return Ok(None);
            }
        };

        self.handle(command)?;
        Ok(Some(command))
    }

    fn handle(&mut self, command: InboxCommand) -> Result<(), PressplotError> {
        match command {
            InboxCommand::Print(request) => {
                let job = self.job_for(request);
                log::info!("PRINT request: {} (seed {})", job.pattern, job.seed);
                let accepted = match self.queue.submit(job) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("PRINT rejected: {}", e);
                        false
                    }
                };
                self.reply(CMD_PRINT, &[accepted as u8])
            }
            InboxCommand::Status => {
                let phase = self.status.get();
                log::debug!("STATUS request: {}", phase);
                self.reply(CMD_STATUS, &[phase.as_byte()])
            }
            InboxCommand::Ping => self.reply(CMD_PING, &[]),
        }
    }

    fn job_for(&mut self, request: PrintRequest) -> GraphJob {
        let seed = request.seed.unwrap_or_else(|| (self.seed_source)());
        let mut job = self.defaults.to_job(seed);
        job.pattern = request.pattern;
        if let Some(thickness) = request.thickness {
            job.thickness = thickness;
        }
        job
    }

    fn reply(&mut self, command: u8, payload: &[u8]) -> Result<(), PressplotError> {
        let frame = Packet::new(command | REPLY_FLAG, payload)?.encode();
        let written = self.transport.write(&frame)?;
        if written != frame.len() {
            log::warn!("Reply {:#04x}: sent {} of {} bytes", command | REPLY_FLAG, written, frame.len());
        }
        self.transport.flush()
    }

    /// Poll until `shutdown` is set. Transport errors end the loop.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), PressplotError> {
        log::info!("Command inbox listening");
        while !shutdown.load(Ordering::Relaxed) {
            self.poll(packet::PACKET_TIMEOUT)?;
        }
        log::info!("Command inbox stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::queue::job_queue;
    use crate::dispatch::status::Phase;
    use crate::transport::MockTransport;
    use pretty_assertions::assert_eq;

    const WAIT: Duration = Duration::from_millis(20);

    fn inbox(capacity: usize) -> (Inbox<MockTransport>, crate::dispatch::queue::JobReceiver, StatusCell) {
        let (queue, rx) = job_queue(capacity);
        let status = StatusCell::new();
        let inbox = Inbox::new(
            MockTransport::new(),
            queue,
            status.clone(),
            JobDefaults::default(),
            Box::new(|| 4242),
        );
        (inbox, rx, status)
    }

    fn send(inbox: &mut Inbox<MockTransport>, packet: &Packet) {
        inbox.transport_mut().push_inbound(&packet.encode());
    }

    fn replies(inbox: &Inbox<MockTransport>) -> Vec<Packet> {
        inbox
            .transport()
            .writes()
            .iter()
            .map(|w| Packet::decode(w).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_print_payloads() {
        let full = Packet::new(CMD_PRINT, &[2, 3, 0x78, 0x56, 0x34, 0x12]).unwrap();
        assert_eq!(
            InboxCommand::parse(&full).unwrap(),
            InboxCommand::Print(PrintRequest {
                pattern: CurvePattern::Linear,
                thickness: Some(3),
                seed: Some(0x1234_5678),
            })
        );

        let short = Packet::new(CMD_PRINT, &[1]).unwrap();
        assert_eq!(
            InboxCommand::parse(&short).unwrap(),
            InboxCommand::Print(PrintRequest {
                pattern: CurvePattern::Quadratic,
                thickness: None,
                seed: None,
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_print() {
        let bad_pattern = Packet::new(CMD_PRINT, &[9]).unwrap();
        assert!(matches!(
            InboxCommand::parse(&bad_pattern),
            Err(PressplotError::InvalidPattern(_))
        ));
        let truncated_seed = Packet::new(CMD_PRINT, &[1, 2, 3]).unwrap();
        assert!(InboxCommand::parse(&truncated_seed).is_err());
        assert!(InboxCommand::parse(&Packet::empty(CMD_PRINT)).is_err());
        assert!(InboxCommand::parse(&Packet::empty(0x7F)).is_err());
    }

    #[test]
    fn test_command_packet_roundtrip() {
        let command = InboxCommand::Print(PrintRequest {
            pattern: CurvePattern::Linear,
            thickness: None,
            seed: Some(7),
        });
        let parsed = InboxCommand::parse(&command.to_packet()).unwrap();
        assert_eq!(
            parsed,
            InboxCommand::Print(PrintRequest {
                pattern: CurvePattern::Linear,
                thickness: Some(crate::job::DEFAULT_THICKNESS),
                seed: Some(7),
            })
        );
    }

    #[test]
    fn test_print_enqueues_job_with_defaults() {
        let (mut inbox, mut rx, _) = inbox(2);
        send(&mut inbox, &Packet::new(CMD_PRINT, &[2, 5]).unwrap());

        let handled = inbox.poll(WAIT).unwrap();
        assert!(matches!(handled, Some(InboxCommand::Print(_))));

        let job = rx.try_next().unwrap();
        assert_eq!(job.pattern, CurvePattern::Linear);
        assert_eq!(job.thickness, 5);
        assert_eq!(job.seed, 4242);
        assert_eq!(job.num_points, JobDefaults::default().points);

        assert_eq!(replies(&inbox), vec![Packet::new(0x81, &[1]).unwrap()]);
    }

    #[test]
    fn test_print_rejected_when_queue_full() {
        let (mut inbox, _rx, _) = inbox(1);
        send(&mut inbox, &Packet::new(CMD_PRINT, &[1]).unwrap());
        send(&mut inbox, &Packet::new(CMD_PRINT, &[1]).unwrap());

        inbox.poll(WAIT).unwrap();
        inbox.poll(WAIT).unwrap();

        assert_eq!(
            replies(&inbox),
            vec![
                Packet::new(0x81, &[1]).unwrap(),
                Packet::new(0x81, &[0]).unwrap(),
            ]
        );
    }

    #[test]
    fn test_status_and_ping_replies() {
        let (mut inbox, _rx, status) = inbox(1);
        status.set(Phase::Printing);
        send(&mut inbox, &Packet::empty(CMD_STATUS));
        send(&mut inbox, &Packet::empty(CMD_PING));

        assert_eq!(inbox.poll(WAIT).unwrap(), Some(InboxCommand::Status));
        assert_eq!(inbox.poll(WAIT).unwrap(), Some(InboxCommand::Ping));

        assert_eq!(
            replies(&inbox),
            vec![
                Packet::new(0x82, &[Phase::Printing.as_byte()]).unwrap(),
                Packet::empty(0x83),
            ]
        );
    }

    #[test]
    fn test_corrupt_packet_ignored() {
        let (mut inbox, mut rx, _) = inbox(1);
        let mut frame = Packet::new(CMD_PRINT, &[1]).unwrap().encode();
        frame[3] ^= 0x01;
        inbox.transport_mut().push_inbound(&frame);

        assert_eq!(inbox.poll(WAIT).unwrap(), None);
        assert!(rx.try_next().is_none());
        assert!(inbox.transport().writes().is_empty());
    }

    #[test]
    fn test_unknown_command_ignored() {
        let (mut inbox, _rx, _) = inbox(1);
        send(&mut inbox, &Packet::empty(0x42));
        assert_eq!(inbox.poll(WAIT).unwrap(), None);
        assert!(inbox.transport().writes().is_empty());
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let (mut inbox, _rx, _) = inbox(1);
        let shutdown = AtomicBool::new(true);
        inbox.run(&shutdown).unwrap();
    }
}
