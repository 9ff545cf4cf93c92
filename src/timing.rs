//! Relative timing buckets for last-action and next-action cells (pure math, no clock).
//!
//! `now` is always passed in so projections are reproducible in tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::ColorToken;

/// Label used when there is no last-action timestamp at all.
pub const NEVER: &str = "Never";

/// Label used when a next action has no due date.
pub const NO_DATE_SET: &str = "No date set";

/// A bucketed timing label with its badge color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingBucket {
    pub text: String,
    pub color: ColorToken,
}

impl TimingBucket {
    fn new(text: impl Into<String>, color: ColorToken) -> Self {
        TimingBucket {
            text: text.into(),
            color,
        }
    }
}

/// Classifier for "time since last action". Hosts can swap in their own
/// bucketing; the projector only depends on this trait.
pub trait ActionTiming: Send + Sync {
    fn last_action_timing(&self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimingBucket;
}

/// Default classifier: minutes and hours within the day, then days, weeks,
/// and months.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimeTiming;

impl ActionTiming for RealtimeTiming {
    fn last_action_timing(&self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimingBucket {
        let Some(at) = at else {
            return TimingBucket::new(NEVER, ColorToken::Neutral);
        };

        let elapsed = now - at;
        let minutes = elapsed.num_minutes();
        if minutes < 1 {
            return TimingBucket::new("Just now", ColorToken::Success);
        }
        if minutes < 60 {
            return TimingBucket::new(format!("{}m ago", minutes), ColorToken::Success);
        }
        let hours = elapsed.num_hours();
        if hours < 24 {
            return TimingBucket::new(format!("{}h ago", hours), ColorToken::Success);
        }

        let days = elapsed.num_days();
        match days {
            1 => TimingBucket::new("Yesterday", ColorToken::Success),
            d if d <= 7 => TimingBucket::new(format!("{} days ago", d), ColorToken::Info),
            d if d <= 30 => TimingBucket::new(plural(d / 7, "week"), ColorToken::Warning),
            d => TimingBucket::new(plural(d / 30, "month"), ColorToken::Danger),
        }
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" })
}

/// Bucket a next-action due date relative to `now`.
pub fn next_action_timing(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimingBucket {
    let Some(due) = due else {
        return TimingBucket::new(NO_DATE_SET, ColorToken::Neutral);
    };

    let due_day = due.date_naive();
    let today = now.date_naive();
    let diff_days = (due_day - today).num_days();

    match diff_days {
        d if d < 0 => TimingBucket::new("Overdue", ColorToken::Danger),
        0 => TimingBucket::new("Today", ColorToken::Warning),
        1 => TimingBucket::new("Tomorrow", ColorToken::Info),
        d if d <= 7 => TimingBucket::new("This week", ColorToken::Neutral),
        d if d <= 14 => TimingBucket::new("Next week", ColorToken::Neutral),
        d if d <= 30 => TimingBucket::new("This month", ColorToken::Neutral),
        _ => TimingBucket::new("Future", ColorToken::Neutral),
    }
}

/// Parse the timestamp shapes the pipeline APIs emit: RFC 3339, SQLite
/// `YYYY-MM-DD HH:MM:SS`, naive ISO with `T`, or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return parse_epoch(raw);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Unix epoch in milliseconds (12+ digits) or seconds.
fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    let value: i64 = raw.parse().ok()?;
    if raw.len() >= 12 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    fn since(offset: Duration) -> TimingBucket {
        RealtimeTiming.last_action_timing(Some(now() - offset), now())
    }

    #[test]
    fn test_missing_timestamp_is_never() {
        let bucket = RealtimeTiming.last_action_timing(None, now());
        assert_eq!(bucket.text, NEVER);
        assert_eq!(bucket.color, ColorToken::Neutral);
    }

    #[test]
    fn test_same_day_buckets() {
        assert_eq!(since(Duration::seconds(20)).text, "Just now");
        assert_eq!(since(Duration::minutes(5)).text, "5m ago");
        assert_eq!(since(Duration::hours(3)).text, "3h ago");
    }

    #[test]
    fn test_future_timestamp_reads_as_just_now() {
        assert_eq!(since(Duration::hours(-2)).text, "Just now");
    }

    #[test]
    fn test_day_week_month_buckets() {
        assert_eq!(since(Duration::days(1)).text, "Yesterday");
        let five = since(Duration::days(5));
        assert_eq!(five.text, "5 days ago");
        assert_eq!(five.color, ColorToken::Info);
        assert_eq!(since(Duration::days(9)).text, "1 week ago");
        assert_eq!(since(Duration::days(21)).text, "3 weeks ago");
        let old = since(Duration::days(95));
        assert_eq!(old.text, "3 months ago");
        assert_eq!(old.color, ColorToken::Danger);
    }

    #[test]
    fn test_next_action_buckets() {
        let at = |days: i64| Some(now() + Duration::days(days));
        assert_eq!(next_action_timing(at(-1), now()).text, "Overdue");
        assert_eq!(next_action_timing(at(0), now()).text, "Today");
        assert_eq!(next_action_timing(at(1), now()).text, "Tomorrow");
        assert_eq!(next_action_timing(at(6), now()).text, "This week");
        assert_eq!(next_action_timing(at(10), now()).text, "Next week");
        assert_eq!(next_action_timing(at(25), now()).text, "This month");
        assert_eq!(next_action_timing(at(60), now()).text, "Future");
        assert_eq!(next_action_timing(None, now()).text, NO_DATE_SET);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T09:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("1705311000000"), Some(expected));
        assert_eq!(parse_timestamp("1705311000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
