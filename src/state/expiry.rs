//! Expiration date arithmetic
//!
//! Pure calendar-date helpers for classifying items by their `valid_date`
//! field. Dates are compared as plain `YYYY-MM-DD` calendar days in local
//! time; time-of-day never enters the comparison. Malformed or unset input
//! degrades to `None` rather than an error, so callers can always run the
//! classification over whatever string is stored.

use chrono::{Local, NaiveDate};

/// Placeholder stored when the user never picked a date
pub const DATE_UNSET: &str = "未设置";

/// Days ahead within which an item counts as expiring soon
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 7;

/// Storage format for `valid_date`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expiry classification of a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    /// Valid date in the past
    Expired,
    /// Valid date within the next [`EXPIRING_SOON_WINDOW_DAYS`] days (today included)
    ExpiringSoon,
    /// Valid date further in the future
    Fresh,
    /// No date set, or the stored string does not parse
    NoDate,
}

/// Whole days between `date_str` and today.
///
/// Positive = future, negative = past, zero = today. Returns `None` for
/// empty, whitespace-only, `未设置` or unparsable input; never panics.
pub fn day_interval(date_str: &str) -> Option<i64> {
    day_interval_from(date_str, Local::now().date_naive())
}

/// Deterministic core of [`day_interval`]: the reference day is a parameter
/// so tests can pin "today".
pub fn day_interval_from(date_str: &str, today: NaiveDate) -> Option<i64> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() || trimmed == DATE_UNSET {
        return None;
    }

    let target = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()?;
    Some((target - today).num_days())
}

/// True when the date is valid and strictly in the past
pub fn is_expired(date_str: &str) -> bool {
    matches!(day_interval(date_str), Some(d) if d < 0)
}

/// True when the date is valid and falls within the default 7-day window
pub fn is_expiring_soon(date_str: &str) -> bool {
    expires_within(date_str, EXPIRING_SOON_WINDOW_DAYS)
}

/// True when the date is valid and `0 <= interval <= window_days`
pub fn expires_within(date_str: &str, window_days: i64) -> bool {
    matches!(day_interval(date_str), Some(d) if d >= 0 && d <= window_days)
}

/// Classify a stored date string against today with the default window
pub fn classify(date_str: &str) -> ExpiryState {
    classify_within(date_str, EXPIRING_SOON_WINDOW_DAYS)
}

/// Classify against today with a caller-chosen expiring-soon window
pub fn classify_within(date_str: &str, window_days: i64) -> ExpiryState {
    classify_with(date_str, Local::now().date_naive(), window_days)
}

/// Fully explicit classification: reference day and window as parameters
pub fn classify_with(date_str: &str, today: NaiveDate, window_days: i64) -> ExpiryState {
    match day_interval_from(date_str, today) {
        None => ExpiryState::NoDate,
        Some(d) if d < 0 => ExpiryState::Expired,
        Some(d) if d <= window_days => ExpiryState::ExpiringSoon,
        Some(_) => ExpiryState::Fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_zero() {
        let today = Local::now().date_naive();
        let today_str = today.format("%Y-%m-%d").to_string();
        assert_eq!(day_interval(&today_str), Some(0));
    }

    #[test]
    fn test_invalid_inputs_are_none() {
        assert_eq!(day_interval("not-a-date"), None);
        assert_eq!(day_interval(""), None);
        assert_eq!(day_interval("   "), None);
        assert_eq!(day_interval("未设置"), None);
        assert_eq!(day_interval("2024-13-40"), None);
    }

    #[test]
    fn test_past_and_future_sign() {
        let today = day(2025, 6, 15);
        assert_eq!(day_interval_from("2025-06-14", today), Some(-1));
        assert_eq!(day_interval_from("2025-06-16", today), Some(1));
        assert_eq!(day_interval_from("2025-06-15", today), Some(0));
        // Month boundary
        assert_eq!(day_interval_from("2025-07-01", today), Some(16));
    }

    #[test]
    fn test_invalid_never_expired_or_expiring() {
        assert!(!is_expired("未设置"));
        assert!(!is_expired(""));
        assert!(!is_expired("garbage"));
        assert!(!is_expiring_soon("未设置"));
        assert!(!is_expiring_soon(""));
        assert!(!is_expiring_soon("garbage"));
    }

    #[test]
    fn test_classify_windows() {
        let today = day(2025, 6, 15);
        let window = EXPIRING_SOON_WINDOW_DAYS;
        assert_eq!(classify_with("2025-06-14", today, window), ExpiryState::Expired);
        assert_eq!(
            classify_with("2025-06-15", today, window),
            ExpiryState::ExpiringSoon
        );
        assert_eq!(
            classify_with("2025-06-22", today, window),
            ExpiryState::ExpiringSoon
        );
        assert_eq!(classify_with("2025-06-23", today, window), ExpiryState::Fresh);
        assert_eq!(classify_with("未设置", today, window), ExpiryState::NoDate);

        // A widened window pulls later dates in
        assert_eq!(
            classify_with("2025-06-30", today, 30),
            ExpiryState::ExpiringSoon
        );
        assert_eq!(classify("未设置"), ExpiryState::NoDate);
    }

    #[test]
    fn test_expires_within_custom_window() {
        let today = Local::now().date_naive();
        let in_three_days = (today + chrono::Duration::days(3))
            .format("%Y-%m-%d")
            .to_string();
        assert!(expires_within(&in_three_days, 3));
        assert!(!expires_within(&in_three_days, 2));
    }
}
