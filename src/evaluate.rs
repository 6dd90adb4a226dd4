//! Pure threshold evaluation — raw measurement in, `Outcome` out.

use crate::models::Outcome;

/// Classify an HTTP response that was actually received.
///
/// Connection-layer failures (timeout, unreachable) never reach this
/// function; they are classified at the probe boundary.
pub fn classify_status(observed: u16, expected: u16) -> Outcome {
    if observed == expected {
        Outcome::Ok
    } else {
        Outcome::UnexpectedResponse
    }
}

/// Classify a resource reading against its threshold.
///
/// The trigger is strictly greater-than: a value equal to the threshold
/// is OK, only exceeding it alerts.
pub fn classify_threshold(value: f64, threshold: f64) -> Outcome {
    if value > threshold {
        Outcome::Alert
    } else {
        Outcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_status_is_ok() {
        assert_eq!(classify_status(200, 200), Outcome::Ok);
        assert_eq!(classify_status(204, 204), Outcome::Ok);
    }

    #[test]
    fn mismatched_status_is_unexpected_response() {
        assert_eq!(classify_status(503, 200), Outcome::UnexpectedResponse);
        assert_eq!(classify_status(200, 204), Outcome::UnexpectedResponse);
    }

    #[test]
    fn value_below_threshold_is_ok() {
        assert_eq!(classify_threshold(42.5, 80.0), Outcome::Ok);
    }

    #[test]
    fn value_equal_to_threshold_is_ok() {
        assert_eq!(classify_threshold(80.0, 80.0), Outcome::Ok);
    }

    #[test]
    fn value_above_threshold_alerts() {
        assert_eq!(classify_threshold(85.0, 80.0), Outcome::Alert);
        assert_eq!(classify_threshold(80.001, 80.0), Outcome::Alert);
    }
}
