//! The window of events a pass reads from the calendar.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::error::{SyncError, SyncResult};

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Window reaching `past_days` back and `future_days` ahead of now.
    /// A `past_days` of `None` leaves the past unbounded.
    pub fn around_now(past_days: Option<i64>, future_days: i64) -> SyncResult<Self> {
        let now = Utc::now();
        let out_of_range = |days: i64| {
            SyncError::Configuration(format!("Window of {days} days is out of range"))
        };

        let from = past_days
            .map(|days| {
                TimeDelta::try_days(days)
                    .and_then(|delta| now.checked_sub_signed(delta))
                    .ok_or_else(|| out_of_range(days))
            })
            .transpose()?;
        let to = TimeDelta::try_days(future_days)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| out_of_range(future_days))?;

        Ok(DateRange { from, to: Some(to) })
    }

    /// Parse command-line bounds, falling back to `default` for missing ones.
    /// - `from`: "start" for unbounded, or YYYY-MM-DD
    /// - `to`: YYYY-MM-DD
    pub fn from_args(from: Option<&str>, to: Option<&str>, default: &DateRange) -> Result<Self, String> {
        let from_dt = match from {
            Some("start") => None,
            Some(s) => Some(parse_date_start(s)?),
            None => default.from,
        };

        let to_dt = match to {
            Some(s) => Some(parse_date_end(s)?),
            None => default.to,
        };

        if let (Some(from), Some(to)) = (from_dt, to_dt)
            && from > to
        {
            return Err(format!("Invalid range: {} is after {}", from.date_naive(), to.date_naive()));
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// Get `from` as RFC3339 string, using the epoch if unbounded.
    pub fn from_rfc3339(&self) -> String {
        self.from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH).to_rfc3339()
    }

    /// Get `to` as RFC3339 string, using a far future date if unbounded.
    pub fn to_rfc3339(&self) -> String {
        self.to.unwrap_or_else(far_future).to_rfc3339()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }
}

fn far_future() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2100, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> Result<DateTime<Utc>, String> {
    let date = parse_date(s)?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> Result<DateTime<Utc>, String> {
    let date = parse_date(s)?;
    Ok(date.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_uses_defaults() {
        let default = DateRange::around_now(Some(30), 30).unwrap();
        let range = DateRange::from_args(None, None, &default).unwrap();
        assert_eq!(range, default);
    }

    #[test]
    fn test_from_args_start_is_unbounded() {
        let default = DateRange::around_now(Some(30), 30).unwrap();
        let range = DateRange::from_args(Some("start"), Some("2030-01-01"), &default).unwrap();

        assert_eq!(range.from, None);
        assert_eq!(range.from_rfc3339(), "1970-01-01T00:00:00+00:00");
        assert_eq!(range.to_rfc3339(), "2030-01-01T23:59:59+00:00");
    }

    #[test]
    fn test_from_args_rejects_bad_input() {
        let default = DateRange::around_now(None, 30).unwrap();
        assert!(DateRange::from_args(Some("01/02/2024"), None, &default).is_err());
        assert!(DateRange::from_args(Some("2024-02-01"), Some("2024-01-01"), &default).is_err());
    }

    #[test]
    fn test_contains() {
        let range = DateRange::from_args(
            Some("2024-01-01"),
            Some("2024-01-31"),
            &DateRange::around_now(None, 0).unwrap(),
        )
        .unwrap();
        let inside = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap().and_utc();
        let outside = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap().and_hms_opt(12, 0, 0).unwrap().and_utc();

        assert!(range.contains(inside));
        assert!(!range.contains(outside));
    }

    #[test]
    fn test_around_now_rejects_huge_windows() {
        assert!(matches!(
            DateRange::around_now(None, i64::MAX),
            Err(SyncError::Configuration(_))
        ));
        assert!(matches!(
            DateRange::around_now(Some(400_000_000), 30),
            Err(SyncError::Configuration(_))
        ));

        let range = DateRange::around_now(Some(7), 7).unwrap();
        assert!(range.from.is_some_and(|from| from < Utc::now()));
    }
}
