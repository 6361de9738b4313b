//! Print worker: takes jobs off the queue and runs them one at a time.
//!
//! Each job runs on the blocking pool. The driver moves into the blocking
//! task and comes back with the result, so exactly one job owns the printer
//! at any moment and nothing can interrupt a transfer in progress.

use std::time::Duration;

use crate::error::PressplotError;
use crate::job::PrintSettings;
use crate::printer::PrinterDriver;
use crate::render::GraphLayout;
use crate::transport::Transport;

use super::queue::{JobReceiver, Next};
use super::status::{Phase, StatusCell};

/// Job counters for one worker lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub completed: usize,
    pub failed: usize,
    /// Completed jobs whose raster lost bytes to short writes
    pub incomplete: usize,
}

/// Run jobs until every producer of `jobs` is gone.
///
/// Between jobs the worker waits at most `idle_timeout`; an idle period
/// after a finished job puts the phase back to [`Phase::Idle`].
///
/// Returns the driver and the counters. A panicking job is reported as
/// [`PressplotError::Task`]; the driver is lost with it.
pub async fn run_worker<T>(
    mut driver: PrinterDriver<T>,
    mut jobs: JobReceiver,
    layout: GraphLayout,
    settings: PrintSettings,
    status: StatusCell,
    idle_timeout: Duration,
) -> Result<(PrinterDriver<T>, WorkerStats), PressplotError>
where
    T: Transport + Send + 'static,
{
    let mut stats = WorkerStats::default();
    log::info!("Print worker started");

    loop {
        match jobs.next(idle_timeout).await {
            Next::Job(job) => {
                let task_status = status.clone();
                let (returned, result) = tokio::task::spawn_blocking(move || {
                    let result = job.run(&mut driver, &layout, &settings, &task_status);
                    (driver, result)
                })
                .await
                .map_err(|e| PressplotError::Task(e.to_string()))?;
                driver = returned;

                match result {
                    Ok(report) if report.is_complete() => stats.completed += 1,
                    Ok(_) => {
                        stats.completed += 1;
                        stats.incomplete += 1;
                    }
                    Err(_) => stats.failed += 1,
                }
            }
            Next::Idle => {
                if !status.get().is_busy() && status.get() != Phase::Idle {
                    status.set(Phase::Idle);
                }
            }
            Next::Closed => break,
        }
    }

    log::info!(
        "Print worker stopped: {} completed, {} failed",
        stats.completed,
        stats.failed
    );
    Ok((driver, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::queue::job_queue;
    use crate::job::GraphJob;
    use crate::printer::{PrinterConfig, Timing};
    use crate::render::CurvePattern;
    use crate::transport::MockTransport;

    fn driver(transport: MockTransport) -> PrinterDriver<MockTransport> {
        PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::immediate())
    }

    #[tokio::test]
    async fn test_worker_runs_queued_jobs_in_order() {
        let (queue, rx) = job_queue(4);
        let status = StatusCell::new();
        queue.submit(GraphJob::new(CurvePattern::Quadratic, 1)).unwrap();
        queue.submit(GraphJob::new(CurvePattern::Linear, 2)).unwrap();
        drop(queue);

        let (driver, stats) = run_worker(
            driver(MockTransport::new()),
            rx,
            GraphLayout::REFERENCE,
            PrintSettings::default(),
            status.clone(),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        assert_eq!(stats, WorkerStats { completed: 2, failed: 0, incomplete: 0 });
        assert_eq!(status.get(), Phase::Done);

        let cuts = driver
            .transport()
            .writes()
            .iter()
            .filter(|w| w.as_slice() == [0x1D, b'V', 0])
            .count();
        assert_eq!(cuts, 2);
    }

    #[tokio::test]
    async fn test_failed_job_counted_and_worker_continues() {
        let (queue, rx) = job_queue(2);
        let status = StatusCell::new();
        queue.submit(GraphJob::new(CurvePattern::Quadratic, 1)).unwrap();
        drop(queue);

        let (_, stats) = run_worker(
            driver(MockTransport::with_write_limit(1)),
            rx,
            GraphLayout::REFERENCE,
            PrintSettings::default(),
            status.clone(),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(status.get(), Phase::Error);
    }

    #[tokio::test]
    async fn test_idle_resets_phase() {
        let (queue, rx) = job_queue(1);
        let status = StatusCell::new();
        status.set(Phase::Done);

        let worker = tokio::spawn(run_worker(
            driver(MockTransport::new()),
            rx,
            GraphLayout::REFERENCE,
            PrintSettings::default(),
            status.clone(),
            Duration::from_millis(5),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(status.get(), Phase::Idle);

        drop(queue);
        worker.await.unwrap().unwrap();
    }
}
