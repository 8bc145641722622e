//! Run Controller Module
//!
//! Owns the load generator's lifecycle (`Idle -> Running -> Stopping ->
//! Completed`) and exposes live counters for polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::FetchOutcome;
use crate::error::{LabError, Result};
use crate::traffic::dispatcher::{Dispatcher, RunCounters};
use crate::traffic::{schedule, Distribution, KeyCatalog, RequestTarget};

const DEFAULT_WORKERS: usize = 10;
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

// == Run Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Stopping,
    Completed,
}

impl RunStatus {
    /// Running or still winding down after a stop.
    pub fn is_active(&self) -> bool {
        matches!(self, RunStatus::Running | RunStatus::Stopping)
    }
}

// == Run Config ==
/// Parameters of one load run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunConfig {
    pub distribution: Distribution,
    /// Mean arrivals per second
    pub rate: f64,
    /// Run length in seconds
    pub duration: f64,
}

// == Load Pattern ==
/// Named preset run configuration.
#[derive(Debug, Clone, Serialize)]
pub struct LoadPattern {
    pub name: &'static str,
    pub description: &'static str,
    pub config: RunConfig,
}

/// Built-in presets covering each distribution.
pub fn patterns() -> Vec<LoadPattern> {
    vec![
        LoadPattern {
            name: "Light Load",
            description: "Light load with evenly spaced arrivals",
            config: RunConfig {
                distribution: Distribution::Uniform,
                rate: 0.5,
                duration: 120.0,
            },
        },
        LoadPattern {
            name: "Normal Load",
            description: "Regular load following a Poisson process",
            config: RunConfig {
                distribution: Distribution::Poisson,
                rate: 2.0,
                duration: 300.0,
            },
        },
        LoadPattern {
            name: "Burst Load",
            description: "Bursty traffic with exponential gaps",
            config: RunConfig {
                distribution: Distribution::Exponential,
                rate: 5.0,
                duration: 180.0,
            },
        },
        LoadPattern {
            name: "Steady Load",
            description: "Constant load with normally distributed gaps",
            config: RunConfig {
                distribution: Distribution::Normal,
                rate: 1.0,
                duration: 600.0,
            },
        },
    ]
}

// == Run Stats ==
/// Snapshot of the current (or last) run.
///
/// `total_scheduled` is the planned arrival count fixed at start, even when the
/// run is stopped early; `success_rate` is taken over requests actually sent.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub status: RunStatus,
    pub distribution: Option<Distribution>,
    pub configured_rate: Option<f64>,
    pub duration: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub total_scheduled: usize,
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub success_rate: f64,
    /// Seconds since start, frozen once the run completes
    pub elapsed_time: f64,
    /// Requests sent per second of elapsed time
    pub current_rate: f64,
    pub avg_response_time_ms: f64,
}

#[derive(Debug, Default)]
struct RunState {
    status: RunStatus,
    config: Option<RunConfig>,
    started_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    finished: Option<Instant>,
    total_scheduled: usize,
    cancel: CancellationToken,
    /// Counters of this run only; workers outliving the grace period keep
    /// reporting here, never into a later run
    counters: Arc<RunCounters>,
}

// == Run Controller ==
/// Starts, stops and reports on load runs. Cloning shares the same run.
#[derive(Clone)]
pub struct RunController {
    target: Arc<dyn RequestTarget>,
    catalog: Arc<KeyCatalog>,
    workers: usize,
    grace_period: Duration,
    state: Arc<Mutex<RunState>>,
}

impl RunController {
    /// Creates an idle controller sending requests for `catalog` keys to `target`.
    pub fn new(target: Arc<dyn RequestTarget>, catalog: KeyCatalog) -> Self {
        Self {
            target,
            catalog: Arc::new(catalog),
            workers: DEFAULT_WORKERS,
            grace_period: DEFAULT_GRACE_PERIOD,
            state: Arc::new(Mutex::new(RunState::default())),
        }
    }

    /// Sets the size of the worker pool.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets how long a finished schedule waits for in-flight requests.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    // == Start ==
    /// Generates the arrival schedule and starts dispatching it in the background.
    ///
    /// Returns the number of scheduled arrivals. Fails with `AlreadyRunning`,
    /// without generating anything, while a previous run is running or stopping.
    /// Each run gets fresh counters.
    pub fn start(&self, config: RunConfig) -> Result<usize> {
        let (schedule, cancel, counters, started) = {
            let mut state = self.state();
            if state.status.is_active() {
                return Err(LabError::AlreadyRunning);
            }

            let schedule =
                schedule::generate(config.distribution, config.rate, config.duration)?;
            let started = Instant::now();
            *state = RunState {
                status: RunStatus::Running,
                config: Some(config),
                started_at: Some(Utc::now()),
                started: Some(started),
                finished: None,
                total_scheduled: schedule.len(),
                cancel: CancellationToken::new(),
                counters: Arc::new(RunCounters::new()),
            };
            (
                schedule,
                state.cancel.clone(),
                Arc::clone(&state.counters),
                started,
            )
        };
        let total = schedule.len();

        info!(
            "Starting load run: distribution={}, rate={}/s, duration={}s, scheduled={}",
            config.distribution, config.rate, config.duration, total
        );

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.target),
            Arc::clone(&self.catalog),
            self.workers,
            counters,
        );
        let controller = self.clone();
        let grace = self.grace_period;
        tokio::spawn(async move {
            let summary = dispatcher.run(&schedule, &cancel, started, grace).await;
            controller.complete(summary.stopped_early);
        });

        Ok(total)
    }

    // == Stop ==
    /// Prevents any further arrival from being dispatched.
    ///
    /// In-flight requests are left to finish. Returns the resulting status.
    pub fn stop(&self) -> RunStatus {
        let mut state = self.state();
        if state.status == RunStatus::Running {
            state.cancel.cancel();
            state.status = RunStatus::Stopping;
            info!("Stop requested, no further requests will be dispatched");
        }
        state.status
    }

    pub fn status(&self) -> RunStatus {
        self.state().status
    }

    // == Stats ==
    pub fn stats(&self) -> RunStats {
        let state = self.state();
        let counters = state.counters.snapshot();

        let elapsed_time = match (state.started, state.finished) {
            (Some(started), Some(finished)) => (finished - started).as_secs_f64(),
            (Some(started), None) => started.elapsed().as_secs_f64(),
            _ => 0.0,
        };
        let completed = counters.succeeded + counters.failed;

        RunStats {
            status: state.status,
            distribution: state.config.map(|c| c.distribution),
            configured_rate: state.config.map(|c| c.rate),
            duration: state.config.map(|c| c.duration),
            started_at: state.started_at,
            total_scheduled: state.total_scheduled,
            sent: counters.sent,
            succeeded: counters.succeeded,
            failed: counters.failed,
            success_rate: ratio(counters.succeeded as f64, counters.sent as f64),
            elapsed_time,
            current_rate: ratio(counters.sent as f64, elapsed_time),
            avg_response_time_ms: ratio(counters.latency_ms_total as f64, completed as f64),
        }
    }

    /// Sends one request outside of any run; a random catalog key is used when
    /// `key` is None. Run counters are not affected.
    pub async fn send_one(&self, key: Option<String>) -> Result<FetchOutcome> {
        let key = key.unwrap_or_else(|| self.catalog.pick(&mut rand::rng()));
        self.target.send(&key).await
    }

    fn complete(&self, stopped_early: bool) {
        {
            let mut state = self.state();
            state.status = RunStatus::Completed;
            state.finished = Some(Instant::now());
        }
        let stats = self.stats();

        info!(
            "Load run completed{}: sent={}/{}, succeeded={}, failed={}, success_rate={:.1}%, actual_rate={:.2}/s, total_time={:.1}s",
            if stopped_early { " (stopped early)" } else { "" },
            stats.sent,
            stats.total_scheduled,
            stats.succeeded,
            stats.failed,
            stats.success_rate * 100.0,
            stats.current_rate,
            stats.elapsed_time
        );
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ratio(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total
    } else {
        0.0
    }
}
