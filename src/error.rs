//! # Error Types
//!
//! This module defines error types used throughout the pressplot library.

use thiserror::Error;

/// Main error type for pressplot operations
#[derive(Debug, Error)]
pub enum PressplotError {
    /// Raster or sample buffer could not be allocated
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// Printer did not accept the reset command
    #[error("Printer initialization failed: {0}")]
    Init(String),

    /// Unsupported curve shape requested
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Inbound command packet failed checksum validation
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Malformed command packet (bad length, truncated frame)
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// Transport accepted fewer bytes than requested
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    /// Raster payload does not match its declared dimensions
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// Driver used before `initialize()` succeeded
    #[error("Printer not ready")]
    NotReady,

    /// Job queue has no free slot
    #[error("Job queue is full")]
    QueueFull,

    /// Job queue receiver is gone
    #[error("Job queue is closed")]
    QueueClosed,

    /// Background print task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),

    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration or layout
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image export error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
