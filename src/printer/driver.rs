//! # Printer Protocol Driver
//!
//! Sends ESC/POS commands and streams raster images over a [`Transport`],
//! pausing after every write.
//!
//! ## States
//!
//! ```text
//!                initialize()
//! Uninitialized ─────────────► Ready ──configure()──► Configuring ──► Ready
//!                                │
//!                                └──print_bitmap()──► Transmitting ──► Ready
//! ```
//!
//! There is no terminal state: a failed transfer returns the driver to
//! `Ready`, and a failed `initialize()` leaves it `Uninitialized` so it can
//! be retried.
//!
//! ## Pacing
//!
//! Every write is followed by `flush()` and a fixed pause from [`Timing`].
//! The serial link has no hardware flow control; the pauses are what keeps
//! the printer's receive buffer from overrunning.

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::error::PressplotError;
use crate::protocol::commands::{self, Alignment};
use crate::protocol::graphics;
use crate::render::FrameBuffer;
use crate::transport::Transport;

use super::config::{PrinterConfig, Timing};

/// Transfer progress is logged each time this many bytes have gone out
const PROGRESS_INTERVAL: usize = 4096;

/// Lifecycle of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Ready,
    Configuring,
    Transmitting,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Uninitialized => "uninitialized",
            DriverState::Ready => "ready",
            DriverState::Configuring => "configuring",
            DriverState::Transmitting => "transmitting",
        };
        f.write_str(name)
    }
}

/// Outcome of one raster transfer.
///
/// Short chunk writes are not fatal; they are counted here so the caller
/// can decide what a partial image means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferReport {
    /// Payload chunks attempted
    pub chunks: usize,
    /// Payload bytes the transport accepted
    pub bytes_sent: usize,
    /// Payload bytes expected
    pub bytes_expected: usize,
    /// Writes that accepted fewer bytes than offered
    pub short_writes: usize,
    /// Extra writes issued for unsent remainders
    pub retries: usize,
}

impl TransferReport {
    /// Whether every payload byte reached the transport.
    pub fn is_complete(&self) -> bool {
        self.bytes_sent == self.bytes_expected
    }

    pub fn bytes_dropped(&self) -> usize {
        self.bytes_expected - self.bytes_sent
    }
}

/// ESC/POS driver over any [`Transport`].
///
/// ## Example
///
/// ```
/// use pressplot::printer::{PrinterConfig, PrinterDriver, Timing};
/// use pressplot::render::FrameBuffer;
/// use pressplot::transport::MockTransport;
///
/// let mut driver = PrinterDriver::new(MockTransport::new(), PrinterConfig::TM_T88III, Timing::immediate());
/// driver.initialize()?;
///
/// let fb = FrameBuffer::new(512, 100)?;
/// let report = driver.print_bitmap(fb.width(), fb.height(), fb.data())?;
/// assert_eq!(report.chunks, 13);
/// # Ok::<(), pressplot::error::PressplotError>(())
/// ```
pub struct PrinterDriver<T: Transport> {
    transport: T,
    config: PrinterConfig,
    timing: Timing,
    state: DriverState,
}

impl<T: Transport> PrinterDriver<T> {
    pub fn new(transport: T, config: PrinterConfig, timing: Timing) -> Self {
        Self {
            transport,
            config,
            timing,
            state: DriverState::Uninitialized,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    #[inline]
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    /// Write, flush, pause. Returns the number of bytes accepted.
    fn send(&mut self, bytes: &[u8], delay: Duration) -> Result<usize, PressplotError> {
        let written = self.transport.write(bytes)?;
        self.transport.flush()?;
        self.pause(delay);
        Ok(written)
    }

    /// Like [`send`](Self::send) for commands whose failure is not fatal.
    fn send_command(&mut self, what: &str, bytes: &[u8], delay: Duration) {
        match self.send(bytes, delay) {
            Ok(n) if n == bytes.len() => {}
            Ok(n) => log::warn!("{}: sent {} of {} bytes", what, n, bytes.len()),
            Err(e) => log::warn!("{}: {}", what, e),
        }
    }

    /// Drop stale inbound bytes, reset the printer twice (reset, then
    /// defaults) and wait for it to settle.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::Init`] if the transport fails or the first reset
    /// is not accepted in full. The driver stays `Uninitialized`.
    pub fn initialize(&mut self) -> Result<(), PressplotError> {
        self.state = DriverState::Uninitialized;

        self.transport
            .discard_input()
            .map_err(|e| PressplotError::Init(format!("discarding input: {}", e)))?;
        self.pause(self.timing.init_settle);

        let reset = commands::init();
        let written = self
            .send(&reset, self.timing.init_settle)
            .map_err(|e| PressplotError::Init(e.to_string()))?;
        if written != reset.len() {
            log::warn!("Printer reset: sent {} of {} bytes", written, reset.len());
            return Err(PressplotError::Init(format!(
                "reset command: sent {} of {} bytes",
                written,
                reset.len()
            )));
        }

        self.send_command("Set defaults", &reset, self.timing.defaults);

        self.state = DriverState::Ready;
        log::info!("{} initialized", self.config.name);
        Ok(())
    }

    /// Print density (0-15), heating break time (0-7) and line height
    /// (at least 24 dots). Out-of-range values are clamped.
    pub fn configure(&mut self, density: u8, break_time: u8, line_height: u8) {
        let resting = self.resting_state();
        if resting == DriverState::Ready {
            self.state = DriverState::Configuring;
        }

        self.send_command(
            "Density",
            &commands::density(density, break_time),
            self.timing.density,
        );
        self.send_command(
            "Line height",
            &commands::line_height(line_height),
            self.timing.line_height,
        );

        self.state = resting;
        log::debug!(
            "Configured density {}, break time {}, line height {}",
            density.min(commands::MAX_DENSITY),
            break_time.min(commands::MAX_BREAK_TIME),
            line_height.max(commands::MIN_LINE_HEIGHT)
        );
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.send_command("Alignment", &commands::align(alignment), self.timing.style);
    }

    /// Character magnification, each clamped to 1-8.
    pub fn set_font_size(&mut self, width: u8, height: u8) {
        self.send_command(
            "Font size",
            &commands::font_size(width, height),
            self.timing.style,
        );
    }

    /// Raw text followed by a line feed.
    pub fn print_text(&mut self, line: &str) {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(commands::LF);
        self.send_command("Text", &bytes, self.timing.text_line);
    }

    /// Stream a raster image: the 8-byte `GS v 0` header, then
    /// `width / 8 * height` payload bytes in chunks of
    /// [`PrinterConfig::chunk_size`], each followed by flush and a pause.
    ///
    /// A chunk the transport only partly accepts gets up to
    /// [`PrinterConfig::max_chunk_retries`] more writes for its remainder;
    /// whatever is still unsent is logged and counted, and the transfer
    /// moves on. Once started, the transfer runs to the end.
    ///
    /// ## Errors
    ///
    /// - [`PressplotError::NotReady`] before a successful `initialize()`
    /// - [`PressplotError::InvalidBitmap`] if `data` is not
    ///   `width / 8 * height` bytes
    /// - [`PressplotError::ShortWrite`] if the header is not accepted in full
    /// - transport errors
    pub fn print_bitmap(
        &mut self,
        width: u16,
        height: u16,
        data: &[u8],
    ) -> Result<TransferReport, PressplotError> {
        if self.state == DriverState::Uninitialized {
            return Err(PressplotError::NotReady);
        }

        let expected = graphics::raster_payload_len(width, height);
        if data.len() != expected {
            return Err(PressplotError::InvalidBitmap(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        self.state = DriverState::Transmitting;
        let result = self.transmit(width, height, data);
        self.state = DriverState::Ready;
        result
    }

    /// [`print_bitmap`](Self::print_bitmap) for a whole framebuffer.
    pub fn print_framebuffer(&mut self, fb: &FrameBuffer) -> Result<TransferReport, PressplotError> {
        self.print_bitmap(fb.width(), fb.height(), fb.data())
    }

    fn transmit(
        &mut self,
        width: u16,
        height: u16,
        data: &[u8],
    ) -> Result<TransferReport, PressplotError> {
        let header = graphics::raster_header(width, height);
        let written = self.send(&header, self.timing.raster_header)?;
        if written != header.len() {
            log::warn!("Raster header: sent {} of {} bytes", written, header.len());
            return Err(PressplotError::ShortWrite {
                expected: header.len(),
                written,
            });
        }

        let mut report = TransferReport {
            bytes_expected: data.len(),
            ..TransferReport::default()
        };
        log::debug!(
            "Sending {}x{} raster ({} bytes, {}-byte chunks)",
            width,
            height,
            data.len(),
            self.config.chunk_size
        );

        for chunk in data.chunks(self.config.chunk_size.max(1)) {
            let before = report.bytes_sent;
            self.send_chunk(chunk, &mut report)?;
            report.chunks += 1;

            if report.bytes_sent / PROGRESS_INTERVAL > before / PROGRESS_INTERVAL {
                log::info!(
                    "  Progress: {}%",
                    report.bytes_sent * 100 / report.bytes_expected.max(1)
                );
            }
        }

        self.pause(self.timing.post_bitmap);

        if report.is_complete() {
            log::info!("Raster sent: {} bytes in {} chunks", report.bytes_sent, report.chunks);
        } else {
            log::warn!(
                "Raster sent with {} bytes missing ({} short writes, {} retries)",
                report.bytes_dropped(),
                report.short_writes,
                report.retries
            );
        }
        Ok(report)
    }

    /// One chunk: first write plus bounded retries of the remainder.
    fn send_chunk(&mut self, chunk: &[u8], report: &mut TransferReport) -> Result<(), PressplotError> {
        let mut offset = 0;
        let mut attempts = 0u8;

        loop {
            let remaining = &chunk[offset..];
            let written = self.send(remaining, self.timing.chunk)?;
            offset += written;
            report.bytes_sent += written;

            if offset == chunk.len() {
                return Ok(());
            }

            report.short_writes += 1;
            log::warn!("Chunk: sent {} of {} bytes", written, remaining.len());

            if attempts >= self.config.max_chunk_retries {
                log::warn!(
                    "Chunk: giving up on {} bytes after {} retries",
                    chunk.len() - offset,
                    attempts
                );
                return Ok(());
            }
            attempts += 1;
            report.retries += 1;
        }
    }

    /// Advance the paper by `lines` lines.
    pub fn feed(&mut self, lines: u8) {
        self.send_command("Feed", &commands::feed_lines(lines), self.timing.feed(lines));
    }

    /// Full cut.
    pub fn cut(&mut self) {
        self.send_command("Cut", &commands::cut_full(), self.timing.cut);
    }

    fn resting_state(&self) -> DriverState {
        match self.state {
            DriverState::Uninitialized => DriverState::Uninitialized,
            _ => DriverState::Ready,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::{ESC, GS};
    use crate::transport::MockTransport;
    use pretty_assertions::assert_eq;

    fn driver(transport: MockTransport) -> PrinterDriver<MockTransport> {
        PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::immediate())
    }

    fn ready_driver() -> PrinterDriver<MockTransport> {
        let mut d = driver(MockTransport::new());
        d.initialize().unwrap();
        d
    }

    #[test]
    fn test_initialize_sends_reset_twice() {
        let mut d = driver(MockTransport::new());
        d.transport_mut().push_inbound(&[0x01, 0x02]);

        d.initialize().unwrap();

        assert_eq!(d.state(), DriverState::Ready);
        assert_eq!(d.transport().writes(), &[vec![ESC, b'@'], vec![ESC, b'@']]);
        assert_eq!(d.transport().discard_count(), 1);
        assert_eq!(d.transport().pending_inbound(), 0);
    }

    #[test]
    fn test_initialize_short_write_fails() {
        let mut d = driver(MockTransport::with_write_limit(1));
        assert!(matches!(d.initialize(), Err(PressplotError::Init(_))));
        assert_eq!(d.state(), DriverState::Uninitialized);
    }

    #[test]
    fn test_bitmap_requires_initialize() {
        let mut d = driver(MockTransport::new());
        let result = d.print_bitmap(8, 1, &[0xFF]);
        assert!(matches!(result, Err(PressplotError::NotReady)));
        assert!(d.transport().writes().is_empty());
    }

    #[test]
    fn test_bitmap_512x100_chunking() {
        let mut d = ready_driver();
        let before = d.transport().writes().len();
        let data = vec![0x55u8; 6400];

        let report = d.print_bitmap(512, 100, &data).unwrap();

        let writes = &d.transport().writes()[before..];
        // One header write plus ceil(6400 / 512) = 13 chunk writes
        assert_eq!(writes.len(), 14);
        assert_eq!(writes[0], vec![GS, b'v', b'0', 0x00, 64, 0, 100, 0]);
        assert!(writes[1..13].iter().all(|w| w.len() == 512));
        assert_eq!(writes[13].len(), 6400 - 12 * 512);
        assert_eq!(writes[1..].concat(), data);

        assert_eq!(report.chunks, 13);
        assert_eq!(report.bytes_sent, 6400);
        assert!(report.is_complete());
        assert_eq!(report.short_writes, 0);
        assert_eq!(d.state(), DriverState::Ready);
    }

    #[test]
    fn test_bitmap_flushes_every_write() {
        let mut d = ready_driver();
        let flushes = d.transport().flush_count();
        d.print_bitmap(512, 100, &[0u8; 6400]).unwrap();
        assert_eq!(d.transport().flush_count() - flushes, 14);
    }

    #[test]
    fn test_bitmap_wrong_payload_length() {
        let mut d = ready_driver();
        let result = d.print_bitmap(512, 100, &[0u8; 100]);
        assert!(matches!(result, Err(PressplotError::InvalidBitmap(_))));
        assert_eq!(d.state(), DriverState::Ready);
    }

    #[test]
    fn test_short_header_write_fails() {
        let mut d = ready_driver();
        // Reset was 2 bytes; a 4-byte limit truncates only the header
        *d.transport_mut() = MockTransport::with_write_limit(4);

        let result = d.print_bitmap(8, 2, &[0xFF, 0x00]);
        assert!(matches!(
            result,
            Err(PressplotError::ShortWrite { expected: 8, written: 4 })
        ));
        // Nothing after the header
        assert_eq!(d.transport().writes().len(), 1);
        assert_eq!(d.state(), DriverState::Ready);
    }

    #[test]
    fn test_short_chunk_is_retried() {
        let mut config = PrinterConfig::TM_T88III;
        config.chunk_size = 16;
        let mut d = PrinterDriver::new(MockTransport::with_write_limit(8), config, Timing::immediate());
        d.initialize().unwrap();
        let before = d.transport().writes().len();

        // 8-dot wide, 16 rows: 16 bytes, one chunk split across two writes
        let data: Vec<u8> = (0..16).collect();
        let report = d.print_bitmap(8, 16, &data).unwrap();

        let writes = &d.transport().writes()[before..];
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[1..].concat(), data);
        assert_eq!(report.short_writes, 1);
        assert_eq!(report.retries, 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_short_chunk_gives_up_after_retries() {
        let mut config = PrinterConfig::TM_T88III;
        config.chunk_size = 40;
        config.max_chunk_retries = 2;
        let mut d = PrinterDriver::new(MockTransport::with_write_limit(8), config, Timing::immediate());
        d.initialize().unwrap();

        let report = d.print_bitmap(8, 40, &[0xAB; 40]).unwrap();

        // First write plus two retries, 8 bytes each
        assert_eq!(report.bytes_sent, 24);
        assert_eq!(report.bytes_dropped(), 16);
        assert_eq!(report.short_writes, 3);
        assert_eq!(report.retries, 2);
        assert!(!report.is_complete());
        assert_eq!(d.state(), DriverState::Ready);
    }

    #[test]
    fn test_configure_clamps() {
        let mut d = ready_driver();
        let before = d.transport().writes().len();
        d.configure(20, 9, 10);

        let writes = &d.transport().writes()[before..];
        assert_eq!(writes, &[vec![0x12, 0x23, 0xF7], vec![ESC, b'3', 24]]);
        assert_eq!(d.state(), DriverState::Ready);
    }

    #[test]
    fn test_text_and_style_commands() {
        let mut d = ready_driver();
        let before = d.transport().writes().len();

        d.set_alignment(Alignment::Center);
        d.set_font_size(2, 9);
        d.print_text("BUILD UP");
        d.feed(3);
        d.cut();

        let writes = &d.transport().writes()[before..];
        assert_eq!(
            writes,
            &[
                vec![ESC, b'a', 1],
                vec![GS, b'!', 0x17],
                b"BUILD UP\n".to_vec(),
                vec![ESC, b'd', 3],
                vec![GS, b'V', 0],
            ]
        );
    }

    #[test]
    fn test_print_framebuffer() {
        let mut d = ready_driver();
        let mut fb = FrameBuffer::new(16, 2).unwrap();
        fb.set_pixel(0, 0);
        let report = d.print_framebuffer(&fb).unwrap();
        assert_eq!(report.bytes_sent, 4);
        assert_eq!(d.transport().writes().last().unwrap(), &vec![0x80, 0, 0, 0]);
    }
}
