//! Report sink.
//!
//! The scheduler hands every tick's `Report` to a `Reporter`; nothing
//! inside probe or scheduler logic logs results directly. The default
//! implementation routes each result to a log level by outcome and
//! keeps the latest report per group for the status API.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::models::{CheckResult, MonitorState, Outcome, Report};

pub trait Reporter: Send + Sync {
    fn emit(&self, report: &Report);
}

pub struct EngineReporter {
    state: Arc<Mutex<MonitorState>>,
}

impl EngineReporter {
    pub fn new(state: Arc<Mutex<MonitorState>>) -> Self {
        Self { state }
    }
}

impl Reporter for EngineReporter {
    fn emit(&self, report: &Report) {
        for result in &report.results {
            let line = render(result);
            match result.outcome {
                Outcome::Ok => info!("{line}"),
                Outcome::Alert => warn!("{line}"),
                _ => error!("{line}"),
            }
        }
        info!(
            "{} health summary: {}/{} OK",
            report.group, report.ok_count, report.total
        );

        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.latest.insert(report.group.clone(), report.clone());
    }
}

fn render(result: &CheckResult) -> String {
    let mut line = format!("{}: {}", result.name, result.outcome);
    if let Some(value) = result.measured_value {
        line.push_str(&format!(" | {:.2}", value));
    }
    if !result.detail.is_empty() {
        line.push_str(&format!(" | {}", result.detail));
    }
    line
}
