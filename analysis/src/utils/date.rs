use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Default window for news and price lookups
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Longest accepted lookback window, about a century
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("from_date {from} cannot be after to_date {to}")]
    FromAfterTo { from: NaiveDate, to: NaiveDate },
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
    #[error("lookback of {days} days from {end} is out of range")]
    WindowOutOfRange { end: NaiveDate, days: i64 },
}

/// A date bound accepted either as `YYYY-MM-DD` text or as a native date type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateBound {
    Text(String),
    Date(NaiveDate),
}

impl DateBound {
    pub fn resolve(&self) -> Result<NaiveDate, DateRangeError> {
        match self {
            DateBound::Text(text) => parse_date(text),
            DateBound::Date(date) => Ok(*date),
        }
    }
}

impl From<&str> for DateBound {
    fn from(value: &str) -> Self {
        DateBound::Text(value.to_string())
    }
}

impl From<String> for DateBound {
    fn from(value: String) -> Self {
        DateBound::Text(value)
    }
}

impl From<NaiveDate> for DateBound {
    fn from(value: NaiveDate) -> Self {
        DateBound::Date(value)
    }
}

impl From<NaiveDateTime> for DateBound {
    fn from(value: NaiveDateTime) -> Self {
        DateBound::Date(value.date())
    }
}

impl<T: TimeZone> From<DateTime<T>> for DateBound {
    fn from(value: DateTime<T>) -> Self {
        DateBound::Date(value.date_naive())
    }
}

/// Parse a `YYYY-MM-DD` string
pub fn parse_date(text: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| DateRangeError::InvalidDate(text.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_timezone(name: &str) -> Result<Tz, DateRangeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DateRangeError::InvalidTimezone(name.to_string()))
}

/// Today's date in the given timezone
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Resolve an optional news window against `today`.
///
/// Neither bound: the last `DEFAULT_LOOKBACK_DAYS` days up to today. Only
/// `to`: the week before it. Only `from`: up to today.
pub fn resolve_date_range(
    from: Option<DateBound>,
    to: Option<DateBound>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), DateRangeError> {
    resolve_date_range_with(from, to, today, DEFAULT_LOOKBACK_DAYS)
}

/// Same as [`resolve_date_range`] with a custom default window length
pub fn resolve_date_range_with(
    from: Option<DateBound>,
    to: Option<DateBound>,
    today: NaiveDate,
    lookback_days: i64,
) -> Result<(NaiveDate, NaiveDate), DateRangeError> {
    let from = from.map(|bound| bound.resolve()).transpose()?;
    let to = to.map(|bound| bound.resolve()).transpose()?;

    let (from, to) = match (from, to) {
        (None, None) => (lookback_start(today, lookback_days)?, today),
        (None, Some(to)) => (lookback_start(to, lookback_days)?, to),
        (Some(from), None) => (from, today),
        (Some(from), Some(to)) => (from, to),
    };

    if from > to {
        return Err(DateRangeError::FromAfterTo { from, to });
    }
    Ok((from, to))
}

/// Start of a `days`-long window ending at `end`.
///
/// Negative windows count as zero. Windows longer than [`MAX_LOOKBACK_DAYS`]
/// or reaching before the earliest representable date are rejected.
pub fn lookback_start(end: NaiveDate, days: i64) -> Result<NaiveDate, DateRangeError> {
    let days = days.max(0);
    if days > MAX_LOOKBACK_DAYS {
        return Err(DateRangeError::WindowOutOfRange { end, days });
    }
    TimeDelta::try_days(days)
        .and_then(|window| end.checked_sub_signed(window))
        .ok_or(DateRangeError::WindowOutOfRange { end, days })
}

/// Every calendar day from `start` to `end` inclusive
pub fn calendar_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Format duration for logging
pub fn format_duration(duration_ms: f64) -> String {
    if duration_ms < 1000.0 {
        format!("{:.1}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.1}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0).floor();
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_default_range_is_last_week() {
        let today = d(2024, 5, 20);
        let (from, to) = resolve_date_range(None, None, today).unwrap();
        assert_eq!(from, d(2024, 5, 13));
        assert_eq!(to, today);
    }

    #[test]
    fn test_only_to_given() {
        let (from, to) =
            resolve_date_range(None, Some("2024-05-10".into()), d(2024, 5, 20)).unwrap();
        assert_eq!(from, d(2024, 5, 3));
        assert_eq!(to, d(2024, 5, 10));
    }

    #[test]
    fn test_only_from_given() {
        let (from, to) =
            resolve_date_range(Some(d(2024, 5, 1).into()), None, d(2024, 5, 20)).unwrap();
        assert_eq!(from, d(2024, 5, 1));
        assert_eq!(to, d(2024, 5, 20));
    }

    #[test]
    fn test_custom_lookback_window() {
        let today = d(2024, 5, 20);
        let (from, to) = resolve_date_range_with(None, None, today, 3).unwrap();
        assert_eq!(from, d(2024, 5, 17));
        assert_eq!(to, today);
    }

    #[test]
    fn test_lookback_start() {
        let today = d(2024, 5, 20);
        assert_eq!(lookback_start(today, 7).unwrap(), d(2024, 5, 13));
        assert_eq!(lookback_start(today, -3).unwrap(), today);
        assert_eq!(
            lookback_start(today, MAX_LOOKBACK_DAYS).unwrap(),
            today - TimeDelta::days(MAX_LOOKBACK_DAYS)
        );
    }

    #[test]
    fn test_oversized_lookback_is_an_error() {
        let today = d(2024, 5, 20);
        for days in [MAX_LOOKBACK_DAYS + 1, 99_999_999_999, i64::MAX] {
            assert_eq!(
                lookback_start(today, days),
                Err(DateRangeError::WindowOutOfRange { end: today, days })
            );
        }

        let result = resolve_date_range_with(None, Some("2024-05-10".into()), today, i64::MAX);
        assert!(matches!(result, Err(DateRangeError::WindowOutOfRange { .. })));

        // near the start of the representable range the subtraction itself fails
        let early = NaiveDate::MIN + TimeDelta::days(10);
        assert!(lookback_start(early, 30).is_err());
    }

    #[test]
    fn test_from_after_to_with_strings() {
        let result = resolve_date_range(
            Some("2024-05-20".into()),
            Some("2024-05-15".into()),
            d(2024, 5, 20),
        );
        assert!(matches!(result, Err(DateRangeError::FromAfterTo { .. })));
    }

    #[test]
    fn test_from_after_to_with_native_dates() {
        let today = d(2024, 5, 20);
        let result = resolve_date_range(
            Some(today.into()),
            Some((today - TimeDelta::days(5)).into()),
            today,
        );
        assert_eq!(
            result,
            Err(DateRangeError::FromAfterTo {
                from: today,
                to: d(2024, 5, 15)
            })
        );
    }

    #[test]
    fn test_datetime_bounds_drop_time() {
        let now = Utc::now();
        let bound: DateBound = now.into();
        assert_eq!(bound.resolve().unwrap(), now.date_naive());
    }

    #[test]
    fn test_invalid_date_string() {
        let result = resolve_date_range(Some("05/20/2024".into()), None, d(2024, 5, 20));
        assert_eq!(
            result,
            Err(DateRangeError::InvalidDate("05/20/2024".to_string()))
        );
    }

    #[test]
    fn test_calendar_days_between() {
        let days = calendar_days_between(d(2024, 2, 27), d(2024, 3, 1));
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], d(2024, 2, 29));
        assert!(calendar_days_between(d(2024, 3, 2), d(2024, 3, 1)).is_empty());
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12.34), "12.3ms");
        assert_eq!(format_duration(1500.0), "1.5s");
        assert_eq!(format_duration(61000.0), "1m1.0s");
    }
}
