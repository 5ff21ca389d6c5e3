//! Transient-error classification and retry pacing.
//!
//! A small fixed set of statuses marks server conditions that resolve on
//! their own; everything else is terminal. Retries are unbounded in count
//! and bounded only by the overall execution deadline.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::PrestoLinkError;

/// Bad gateway, service unavailable, gateway timeout.
const TRANSIENT_STATUSES: [u16; 3] = [502, 503, 504];

const RETRY_DELAY_FLOOR_MS: u64 = 20;
const RETRY_DELAY_SPAN_MS: u64 = 80;

/// Whether a status code marks a retryable server condition.
pub(crate) fn is_transient(code: u16) -> bool {
    TRANSIENT_STATUSES.contains(&code)
}

/// The transient status carried by an error, if it carries one.
pub(crate) fn transient_status(err: &PrestoLinkError) -> Option<u16> {
    match err {
        PrestoLinkError::InvalidResponseCode { code, .. } if is_transient(*code) => Some(*code),
        _ => None,
    }
}

/// Short randomized delay before resubmitting, so concurrent clients hitting
/// the same overloaded coordinator do not resubmit in lockstep.
pub(crate) fn retry_delay(attempt: u64) -> Duration {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut hasher = DefaultHasher::new();
    (attempt, now).hash(&mut hasher);
    Duration::from_millis(RETRY_DELAY_FLOOR_MS + hasher.finish() % RETRY_DELAY_SPAN_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(502));
        assert!(is_transient(503));
        assert!(is_transient(504));
        assert!(!is_transient(500));
        assert!(!is_transient(404));
        assert!(!is_transient(200));
    }

    #[test]
    fn test_transient_status_extraction() {
        let transient = PrestoLinkError::InvalidResponseCode {
            code: 503,
            body: None,
        };
        assert_eq!(transient_status(&transient), Some(503));

        let terminal = PrestoLinkError::InvalidResponseCode {
            code: 500,
            body: Some("boom".to_string()),
        };
        assert_eq!(transient_status(&terminal), None);
        assert_eq!(transient_status(&PrestoLinkError::Timeout), None);
    }

    #[test]
    fn test_retry_delay_stays_in_band() {
        for attempt in 0..50 {
            let delay = retry_delay(attempt);
            assert!(delay >= Duration::from_millis(RETRY_DELAY_FLOOR_MS));
            assert!(delay < Duration::from_millis(RETRY_DELAY_FLOOR_MS + RETRY_DELAY_SPAN_MS));
        }
    }
}
