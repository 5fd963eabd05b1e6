//! Time helpers
//!
//! Every stored timestamp is `i64` Unix millis (UTC).

use chrono::{DateTime, Datelike, Utc};

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Calendar month (1-12, UTC) of a Unix-millis timestamp
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn month_of(millis: i64) -> Option<u32> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_of() {
        // 2024-01-01T00:00:00Z
        assert_eq!(month_of(1_704_067_200_000), Some(1));
        // 2024-12-31T23:59:59.999Z
        assert_eq!(month_of(1_735_689_599_999), Some(12));
        // 2024-07-15T12:00:00Z
        assert_eq!(month_of(1_721_044_800_000), Some(7));
        assert_eq!(month_of(i64::MAX), None);
    }

    #[test]
    fn test_now_is_recent() {
        let now = now_millis();
        // After 2024-01-01
        assert!(now > 1_704_067_200_000);
    }
}
