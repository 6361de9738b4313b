//! Shared job phase and the status indicator that displays it.
//!
//! The print worker writes the phase; the status loop reads it far more
//! often. The value sits behind a mutex so a reader never sees a torn
//! update.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;

/// Where the current job is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Phase {
    #[default]
    Idle = 0,
    Initializing = 1,
    Rendering = 2,
    Configuring = 3,
    Printing = 4,
    Finishing = 5,
    Done = 6,
    Error = 7,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Initializing => "initializing",
            Phase::Rendering => "rendering",
            Phase::Configuring => "configuring",
            Phase::Printing => "printing",
            Phase::Finishing => "finishing",
            Phase::Done => "done",
            Phase::Error => "error",
        }
    }

    /// Indicator color as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            Phase::Idle => [0, 0, 32],
            Phase::Initializing => [255, 255, 0],
            Phase::Rendering => [0, 255, 255],
            Phase::Configuring => [255, 128, 0],
            Phase::Printing => [0, 0, 255],
            Phase::Finishing => [128, 0, 255],
            Phase::Done => [0, 255, 0],
            Phase::Error => [255, 0, 0],
        }
    }

    /// Wire value, as carried by the STATUS reply.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Phase::Idle,
            1 => Phase::Initializing,
            2 => Phase::Rendering,
            3 => Phase::Configuring,
            4 => Phase::Printing,
            5 => Phase::Finishing,
            6 => Phase::Done,
            7 => Phase::Error,
            _ => return None,
        })
    }

    /// Whether a job is in flight.
    pub fn is_busy(self) -> bool {
        !matches!(self, Phase::Idle | Phase::Done | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cloneable handle to the current [`Phase`].
#[derive(Debug, Clone, Default)]
pub struct StatusCell {
    phase: Arc<Mutex<Phase>>,
}

impl StatusCell {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a Phase half-written.
    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Phase {
        *self.lock()
    }

    /// Store `phase`, returning the previous one.
    pub fn set(&self, phase: Phase) -> Phase {
        let previous = std::mem::replace(&mut *self.lock(), phase);
        if previous != phase {
            log::debug!("Phase: {} -> {}", previous, phase);
        }
        previous
    }
}

/// Something that can show the phase to a human: an RGB LED, a log line.
pub trait StatusIndicator: Send {
    fn show(&mut self, phase: Phase);
}

/// Indicator that logs each phase change with its color.
#[derive(Debug, Default)]
pub struct LogIndicator {
    shown: Vec<Phase>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every phase shown so far, in order.
    pub fn history(&self) -> &[Phase] {
        &self.shown
    }
}

impl StatusIndicator for LogIndicator {
    fn show(&mut self, phase: Phase) {
        let [r, g, b] = phase.color();
        log::info!("Status: {} (#{:02x}{:02x}{:02x})", phase, r, g, b);
        self.shown.push(phase);
    }
}

/// Poll `status` every `interval` and hand each change to `indicator`.
///
/// Returns the indicator once `shutdown` turns true or its sender is
/// dropped.
pub async fn run_status_loop<I: StatusIndicator>(
    status: StatusCell,
    mut indicator: I,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> I {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    let mut last: Option<Phase> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let phase = status.get();
                if last != Some(phase) {
                    indicator.show(phase);
                    last = Some(phase);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    indicator
}
