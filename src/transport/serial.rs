//! # Serial TTY Transport
//!
//! This module talks to the printer (and to the command port) through a tty
//! device such as `/dev/ttyUSB0` or a UART.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary raster data is transmitted
//! without modification:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity, 1 stop bit)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//! - **Read timeout**: VMIN=0, VTIME=1, so `read` returns 0 after 100ms of
//!   silence instead of blocking forever
//!
//! XON/XOFF software flow control stays disabled even though some printers
//! advertise it: 0x11 and 0x13 appear in raster payloads and would be eaten
//! by the line discipline. Pacing is done by the driver instead.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::PressplotError;

use super::Transport;

/// Default printer device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default baud rate of the TM-T88III serial interface
pub const DEFAULT_BAUD: u32 = 19200;

/// Baud rates the transport can configure
pub const SUPPORTED_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200];

/// # Serial Printer Transport
///
/// ## Example
///
/// ```no_run
/// use pressplot::transport::{SerialTransport, Transport};
/// use pressplot::protocol::commands;
///
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", 19200)?;
/// transport.write(&commands::init())?;
/// transport.flush()?;
///
/// # Ok::<(), pressplot::error::PressplotError>(())
/// ```
pub struct SerialTransport {
    file: File,
}

impl SerialTransport {
    /// Open a tty and configure it for raw binary communication.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - The baud rate is not one of [`SUPPORTED_BAUD_RATES`]
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, baud: u32) -> Result<Self, PressplotError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                PressplotError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(&file, baud)?;
        log::info!("Opened {} at {} baud", path.display(), baud);

        Ok(Self { file })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, PressplotError> {
        self.file
            .write(data)
            .map_err(|e| PressplotError::Transport(format!("Write failed: {}", e)))
    }

    fn flush(&mut self) -> Result<(), PressplotError> {
        self.file
            .flush()
            .map_err(|e| PressplotError::Transport(format!("Flush failed: {}", e)))?;
        drain_output(&self.file)
    }

    fn discard_input(&mut self) -> Result<(), PressplotError> {
        discard_pending_input(&self.file)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PressplotError> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(PressplotError::Transport(format!("Read failed: {}", e))),
        }
    }
}

/// Whether the transport can configure the given baud rate.
pub fn is_supported_baud(baud: u32) -> bool {
    SUPPORTED_BAUD_RATES.contains(&baud)
}

#[cfg(unix)]
fn baud_constant(baud: u32) -> Result<libc::speed_t, PressplotError> {
    match baud {
        9600 => Ok(libc::B9600),
        19200 => Ok(libc::B19200),
        38400 => Ok(libc::B38400),
        57600 => Ok(libc::B57600),
        115200 => Ok(libc::B115200),
        other => Err(PressplotError::Config(format!(
            "Unsupported baud rate {} (supported: {:?})",
            other, SUPPORTED_BAUD_RATES
        ))),
    }
}

/// Configure a tty for raw 8N1 mode at the given baud rate.
///
/// ## What Gets Disabled
///
/// - **Input flags**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL, IXON, IXOFF, IXANY
/// - **Output flags**: OPOST
/// - **Local flags**: ECHO, ECHONL, ICANON, ISIG, IEXTEN
/// - **Control flags**: CSIZE, PARENB, CSTOPB, CRTSCTS (then CS8 | CREAD | CLOCAL)
#[cfg(unix)]
fn configure_tty_raw(file: &File, baud: u32) -> Result<(), PressplotError> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let speed = baud_constant(baud)?;
    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PressplotError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB | libc::CRTSCTS);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    // Reads return after 100ms without data
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed);
        libc::cfsetospeed(&mut termios, speed);
        libc::tcsetattr(fd, libc::TCSANOW, &termios)
    };
    if result != 0 {
        return Err(PressplotError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File, _baud: u32) -> Result<(), PressplotError> {
    Err(PressplotError::Transport(
        "Serial transport is only supported on Unix".to_string(),
    ))
}

#[cfg(unix)]
fn drain_output(file: &File) -> Result<(), PressplotError> {
    use std::os::unix::io::AsRawFd;

    let result = unsafe { libc::tcdrain(file.as_raw_fd()) };
    if result != 0 {
        return Err(PressplotError::Transport(format!(
            "tcdrain failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn drain_output(_file: &File) -> Result<(), PressplotError> {
    Ok(())
}

#[cfg(unix)]
fn discard_pending_input(file: &File) -> Result<(), PressplotError> {
    use std::os::unix::io::AsRawFd;

    let result = unsafe { libc::tcflush(file.as_raw_fd(), libc::TCIFLUSH) };
    if result != 0 {
        return Err(PressplotError::Transport(format!(
            "tcflush failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn discard_pending_input(_file: &File) -> Result<(), PressplotError> {
    Ok(())
}

// ============================================================================
// PORT DISCOVERY
// ============================================================================

/// Directory scanned by [`list_ports`]
pub const DEVICE_DIR: &str = "/dev";

/// Device name prefixes that can carry a printer link, with their kind
const PORT_KINDS: &[(&str, &str)] = &[
    ("ttyUSB", "USB serial adapter"),
    ("ttyACM", "USB CDC ACM"),
    ("ttyAMA", "on-board UART"),
    ("ttyS", "UART"),
    ("rfcomm", "Bluetooth RFCOMM"),
    ("cu.usbserial", "USB serial adapter"),
    ("cu.usbmodem", "USB CDC ACM"),
];

/// A candidate serial device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub path: PathBuf,
    pub kind: &'static str,
}

/// Candidate serial devices under [`DEVICE_DIR`], sorted by path.
pub fn list_ports() -> Result<Vec<PortInfo>, PressplotError> {
    list_ports_in(Path::new(DEVICE_DIR))
}

/// Candidate serial devices in `dir`, sorted by path.
pub fn list_ports_in(dir: &Path) -> Result<Vec<PortInfo>, PressplotError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        PressplotError::Transport(format!("Failed to list {}: {}", dir.display(), e))
    })?;

    let mut ports: Vec<PortInfo> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            let (_, kind) = PORT_KINDS.iter().find(|(prefix, _)| {
                name.strip_prefix(prefix).is_some_and(|rest| !rest.is_empty())
            })?;
            Some(PortInfo {
                path: entry.path(),
                kind: *kind,
            })
        })
        .collect();

    ports.sort_by(|a, b| a.path.cmp(&b.path));
    log::debug!("Found {} candidate ports in {}", ports.len(), dir.display());
    Ok(ports)
}

// ============================================================================
// TESTS
// ============================================================================
