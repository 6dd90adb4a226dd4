use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Classification of a single probe invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Ok,
    Alert,
    Timeout,
    Unreachable,
    UnexpectedResponse,
    InternalError,
}

impl Outcome {
    pub fn is_ok(self) -> bool {
        self == Outcome::Ok
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Ok => "OK",
            Outcome::Alert => "ALERT",
            Outcome::Timeout => "TIMEOUT",
            Outcome::Unreachable => "UNREACHABLE",
            Outcome::UnexpectedResponse => "UNEXPECTED_RESPONSE",
            Outcome::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(s)
    }
}

/// The atomic outcome of one probe invocation.
///
/// `measured_value` is the response time in seconds for HTTP probes, or
/// the metric reading for resource probes. It is `None` only when no
/// measurement could be obtained (connection failures, internal errors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub outcome: Outcome,
    pub measured_value: Option<f64>,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// All results from one scheduler tick, in configured probe order.
///
/// The summary counts are computed once at construction; a report is
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub group: String,
    pub results: Vec<CheckResult>,
    pub generated_at: DateTime<Utc>,
    pub ok_count: usize,
    pub total: usize,
}

impl Report {
    pub fn new(group: impl Into<String>, results: Vec<CheckResult>) -> Self {
        let ok_count = results.iter().filter(|r| r.outcome.is_ok()).count();
        let total = results.len();
        Self {
            group: group.into(),
            results,
            generated_at: Utc::now(),
            ok_count,
            total,
        }
    }
}

/// Latest report per monitor group, shared with the status API.
#[derive(Default)]
pub struct MonitorState {
    pub latest: HashMap<String, Report>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: Outcome) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            outcome,
            measured_value: None,
            detail: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn report_counts_ok_vs_not_ok() {
        let report = Report::new(
            "apps",
            vec![
                result("a", Outcome::Ok),
                result("b", Outcome::Timeout),
                result("c", Outcome::Ok),
                result("d", Outcome::Alert),
            ],
        );
        assert_eq!(report.ok_count, 2);
        assert_eq!(report.total, 4);
    }

    #[test]
    fn empty_report_has_zero_counts() {
        let report = Report::new("system", Vec::new());
        assert_eq!(report.ok_count, 0);
        assert_eq!(report.total, 0);
    }

    #[test]
    fn outcome_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Outcome::UnexpectedResponse).unwrap();
        assert_eq!(json, "\"UNEXPECTED_RESPONSE\"");
        let json = serde_json::to_string(&Outcome::Ok).unwrap();
        assert_eq!(json, "\"OK\"");
    }
}
