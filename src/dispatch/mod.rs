//! # Dispatch
//!
//! Decides *when* to print. Two contexts cooperate:
//!
//! ```text
//!   command port ──► Inbox ──submit──► JobQueue ──► worker ──► PrinterDriver
//!                      │                (bounded)      │
//!                      └──── reads ──► StatusCell ◄────┘ writes
//!                                          │
//!                                  status loop ──► StatusIndicator
//! ```
//!
//! They share only the [`StatusCell`] and the [`JobQueue`], both created
//! by the caller and passed in explicitly.

pub mod inbox;
pub mod queue;
pub mod status;
pub mod worker;

pub use inbox::{Inbox, InboxCommand, PrintRequest};
pub use queue::{JobQueue, JobReceiver, Next, job_queue};
pub use status::{LogIndicator, Phase, StatusCell, StatusIndicator, run_status_loop};
pub use worker::{WorkerStats, run_worker};
