//! Load Dispatcher Module
//!
//! Single scheduling task that releases requests at their arrival offsets into
//! a queue drained by a fixed pool of workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::traffic::{ArrivalSchedule, KeyCatalog, RequestTarget};

/// How often, in dispatched requests, progress is logged.
const PROGRESS_EVERY: u64 = 10;

// == Run Counters ==
/// Live counters shared by the scheduler and the workers.
#[derive(Debug, Default)]
pub struct RunCounters {
    sent: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    latency_ms_total: AtomicU64,
}

/// Point-in-time copy of [`RunCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub latency_ms_total: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a request handed to the worker pool. Returns the new total.
    pub fn record_sent(&self) -> u64 {
        self.sent.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_success(&self, elapsed: Duration) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.latency_ms_total
            .fetch_add(elapsed.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, elapsed: Duration) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.latency_ms_total
            .fetch_add(elapsed.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            sent: self.sent.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            latency_ms_total: self.latency_ms_total.load(Ordering::SeqCst),
        }
    }
}

// == Dispatch Summary ==
/// How a dispatch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Requests handed to the worker pool
    pub dispatched: u64,
    /// The loop ended on a stop request before the schedule ran out
    pub stopped_early: bool,
    /// Every worker finished within the grace period
    pub drained: bool,
}

// == Dispatcher ==
/// Drives one schedule against a request target.
#[derive(Clone)]
pub struct Dispatcher {
    target: Arc<dyn RequestTarget>,
    catalog: Arc<KeyCatalog>,
    workers: usize,
    counters: Arc<RunCounters>,
}

impl Dispatcher {
    pub fn new(
        target: Arc<dyn RequestTarget>,
        catalog: Arc<KeyCatalog>,
        workers: usize,
        counters: Arc<RunCounters>,
    ) -> Self {
        Self {
            target,
            catalog,
            workers: workers.max(1),
            counters,
        }
    }

    /// Dispatches every arrival of `schedule`, measured from `started`.
    ///
    /// The loop never waits on a request: jobs go to a queue sized to the
    /// schedule and workers pick them up. Once `cancel` fires, no further
    /// arrival is dispatched, but queued and in-flight requests still run. After
    /// the loop, waits up to `grace` for the workers to drain the queue.
    pub async fn run(
        &self,
        schedule: &ArrivalSchedule,
        cancel: &CancellationToken,
        started: Instant,
        grace: Duration,
    ) -> DispatchSummary {
        let (tx, rx) = mpsc::channel::<String>(schedule.len().max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handles: Vec<JoinHandle<()>> = (0..self.workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&rx),
                    Arc::clone(&self.target),
                    Arc::clone(&self.counters),
                ))
            })
            .collect();

        let total = schedule.len();
        let mut rng = StdRng::from_rng(&mut rand::rng());
        let mut dispatched = 0;
        let mut stopped_early = false;

        for offset in schedule.iter() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(started + offset) => {}
            }
            if cancel.is_cancelled() {
                stopped_early = true;
                break;
            }

            let key = self.catalog.pick(&mut rng);
            // Counted before enqueueing so succeeded + failed never exceeds sent
            dispatched = self.counters.record_sent();
            if tx.send(key).await.is_err() {
                warn!("worker pool is gone, abandoning the schedule");
                break;
            }

            if dispatched % PROGRESS_EVERY == 0 {
                let elapsed = started.elapsed().as_secs_f64();
                let current_rate = if elapsed > 0.0 {
                    dispatched as f64 / elapsed
                } else {
                    0.0
                };
                info!(
                    "Progress: {}/{} requests dispatched (current rate {:.2}/s)",
                    dispatched, total, current_rate
                );
            }
        }
        drop(tx);

        let drained = tokio::time::timeout(grace, async move {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await
        .is_ok();
        if !drained {
            warn!(
                "workers still busy after the {:?} grace period, leaving them to finish",
                grace
            );
        }

        DispatchSummary {
            dispatched,
            stopped_early,
            drained,
        }
    }
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    target: Arc<dyn RequestTarget>,
    counters: Arc<RunCounters>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(key) = next else {
            break;
        };

        let started = Instant::now();
        match target.send(&key).await {
            Ok(outcome) => {
                let elapsed = started.elapsed();
                counters.record_success(elapsed);
                debug!(
                    worker = id,
                    key = %key,
                    cache_hit = outcome.cache_hit,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "request succeeded"
                );
            }
            Err(e) => {
                let elapsed = started.elapsed();
                counters.record_failure(elapsed);
                debug!(worker = id, key = %key, error = %e, "request failed");
            }
        }
    }
}
