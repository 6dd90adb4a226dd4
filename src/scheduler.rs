//! Per-group tick loop.
//!
//! Each monitor group gets its own `Scheduler`: a fixed-interval loop
//! that runs every probe in the group, builds one `Report` per tick,
//! and hands it to the reporter. Groups never share state or
//! synchronize with each other.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::Report;
use crate::probe::Probe;
use crate::reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

pub struct Scheduler {
    group: String,
    probes: Vec<Probe>,
    interval: Duration,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(group: impl Into<String>, probes: Vec<Probe>, interval: Duration) -> Self {
        Self {
            group: group.into(),
            probes,
            interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run one tick: every probe concurrently, results collected in
    /// configured order regardless of completion order.
    ///
    /// A probe whose platform read fails contributes no result; the
    /// skip is logged and the rest of the tick proceeds.
    pub async fn tick(&self) -> Report {
        let outcomes =
            futures::future::join_all(self.probes.iter().map(|p| p.run())).await;

        let mut results = Vec::with_capacity(self.probes.len());
        for (probe, outcome) in self.probes.iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(
                        group = %self.group,
                        probe = %probe.name(),
                        error = %e,
                        "metric read failed, skipping probe for this tick"
                    );
                }
            }
        }
        Report::new(self.group.clone(), results)
    }

    /// Drive the tick loop until the shutdown signal fires.
    ///
    /// The first tick runs immediately. Timing policy is fixed-delay:
    /// the full interval elapses between the end of one tick and the
    /// start of the next. A shutdown signal arriving mid-sleep stops
    /// the loop before another tick starts; an in-flight tick always
    /// completes and its report is emitted.
    pub async fn run(&mut self, reporter: Arc<dyn Reporter>, mut shutdown: watch::Receiver<bool>) {
        info!(
            group = %self.group,
            probes = self.probes.len(),
            interval_secs = self.interval.as_secs_f64(),
            "scheduler started"
        );
        self.state = SchedulerState::Running;

        while !*shutdown.borrow() {
            let report = self.tick().await;
            reporter.emit(&report);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.state = SchedulerState::Stopped;
        info!(group = %self.group, "scheduler stopped");
    }
}
