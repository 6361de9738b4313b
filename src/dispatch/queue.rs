//! Bounded job queue between the command inbox and the print worker.
//!
//! The producer never waits: a full queue rejects the job with
//! [`PressplotError::QueueFull`]. The consumer waits with an idle timeout
//! so the worker loop can do housekeeping between jobs.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::PressplotError;
use crate::job::GraphJob;

/// Queue slots when not configured
pub const DEFAULT_CAPACITY: usize = 4;

/// Producer half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<GraphJob>,
}

/// Consumer half, owned by the print worker.
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::Receiver<GraphJob>,
}

/// Result of waiting for a job
#[derive(Debug)]
pub enum Next {
    Job(GraphJob),
    /// Nothing arrived within the idle timeout
    Idle,
    /// Every producer is gone
    Closed,
}

/// Create a queue holding at most `capacity` pending jobs (minimum 1).
pub fn job_queue(capacity: usize) -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (JobQueue { tx }, JobReceiver { rx })
}

impl JobQueue {
    /// Enqueue without blocking.
    ///
    /// ## Errors
    ///
    /// - [`PressplotError::QueueFull`] when every slot is taken
    /// - [`PressplotError::QueueClosed`] when the worker has stopped
    pub fn submit(&self, job: GraphJob) -> Result<(), PressplotError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                log::warn!("Job queue full, rejecting {} job (seed {})", job.pattern, job.seed);
                Err(PressplotError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(PressplotError::QueueClosed),
        }
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }
}

impl JobReceiver {
    /// Wait up to `idle_timeout` for the next job.
    pub async fn next(&mut self, idle_timeout: Duration) -> Next {
        match tokio::time::timeout(idle_timeout, self.rx.recv()).await {
            Ok(Some(job)) => Next::Job(job),
            Ok(None) => Next::Closed,
            Err(_) => Next::Idle,
        }
    }

    /// Take a job if one is already waiting.
    pub fn try_next(&mut self) -> Option<GraphJob> {
        self.rx.try_recv().ok()
    }
}
