use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::collections::BTreeSet;

use crate::errors::AppError;
use crate::utils::validation::DATE_RE;

/// Largest UTC offset in use anywhere (UTC+14 / UTC-12, rounded up).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Half-open calendar month `[start, end)`. `end` is always the first day of
/// the following month, so no "last day of month" arithmetic is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// `month` is 1-based. Years are limited to four digits so both bounds
    /// render as `YYYY-MM-DD`.
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::BadRequest("Month must be between 1 and 12".to_string()));
        }
        if !(1..=9998).contains(&year) {
            return Err(AppError::BadRequest("Year must be between 1 and 9998".to_string()));
        }

        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let start = NaiveDate::from_ymd_opt(year, month, 1);
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1);
        match (start, end) {
            (Some(start), Some(end)) => Ok(MonthRange { start, end }),
            _ => Err(AppError::BadRequest("Invalid year or month".to_string())),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Collapses one-entry-per-log into one entry per day, ascending.
pub fn distinct_dates<I>(dates: I) -> Vec<String>
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Strict `YYYY-MM-DD` that also names a real day (rejects `2024-02-30`).
pub fn parse_log_date(value: &str) -> Result<NaiveDate, AppError> {
    if !DATE_RE.is_match(value) {
        return Err(AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date is not a valid calendar day".to_string()))
}

/// Today's calendar date for the caller: at the given UTC offset, or in the
/// server's local timezone when none is given.
pub fn local_today(now: DateTime<Utc>, utc_offset_minutes: Option<i32>) -> Result<NaiveDate, AppError> {
    match utc_offset_minutes {
        Some(minutes) => {
            let offset = (-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES)
                .contains(&minutes)
                .then(|| FixedOffset::east_opt(minutes * 60))
                .flatten()
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "utc_offset_minutes must be between -{0} and {0}",
                        MAX_UTC_OFFSET_MINUTES
                    ))
                })?;
            Ok(now.with_timezone(&offset).date_naive())
        }
        None => Ok(now.with_timezone(&Local).date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn is_first_of_month(date: NaiveDate) -> bool {
        date.day() == 1
    }

    fn ymd(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn december_rolls_into_next_year() {
        let range = MonthRange::new(2024, 12).unwrap();
        assert_eq!(range.start.to_string(), "2024-12-01");
        assert_eq!(range.end.to_string(), "2025-01-01");
    }

    #[test]
    fn end_is_always_first_of_following_month() {
        for year in [1999, 2023, 2024, 2100] {
            for month in 1..=12 {
                let range = MonthRange::new(year, month).unwrap();
                assert!(is_first_of_month(range.start));
                assert!(is_first_of_month(range.end));
                let expected_month = if month == 12 { 1 } else { month + 1 };
                let expected_year = if month == 12 { year + 1 } else { year };
                assert_eq!(range.end.month(), expected_month);
                assert_eq!(range.end.year(), expected_year);
            }
        }
    }

    #[test]
    fn february_leap_year_is_half_open() {
        let range = MonthRange::new(2024, 2).unwrap();
        assert_eq!(range.end.to_string(), "2024-03-01");
        assert!(range.contains(ymd("2024-02-29")));
        assert!(!range.contains(ymd("2024-03-01")));
        assert!(!range.contains(ymd("2024-01-31")));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        assert!(matches!(MonthRange::new(2024, 0), Err(AppError::BadRequest(_))));
        assert!(matches!(MonthRange::new(2024, 13), Err(AppError::BadRequest(_))));
        assert!(matches!(MonthRange::new(0, 5), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn distinct_dates_collapses_same_day() {
        let dates = vec![ymd("2024-06-03"), ymd("2024-06-01"), ymd("2024-06-03"), ymd("2024-06-03")];
        assert_eq!(distinct_dates(dates), vec!["2024-06-01", "2024-06-03"]);
        assert!(distinct_dates(Vec::new()).is_empty());
    }

    #[test]
    fn log_date_must_be_strict_and_real() {
        assert_eq!(parse_log_date("2024-06-01").unwrap(), ymd("2024-06-01"));
        for bad in ["2024-6-1", "2024/06/01", "2024-06-01T00:00:00", " 2024-06-01", "2024-02-30", ""] {
            assert!(parse_log_date(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn offset_picks_local_calendar_day() {
        // 23:30 UTC on May 31 is already June 1 in UTC+2 and still May 31 in UTC-5
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 23, 30, 0).unwrap();
        assert_eq!(local_today(now, Some(120)).unwrap(), ymd("2024-06-01"));
        assert_eq!(local_today(now, Some(-300)).unwrap(), ymd("2024-05-31"));
        assert_eq!(local_today(now, Some(0)).unwrap(), ymd("2024-05-31"));
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        let now = Utc::now();
        assert!(local_today(now, Some(15 * 60)).is_err());
        assert!(local_today(now, Some(-15 * 60)).is_err());
        assert!(local_today(now, Some(i32::MIN)).is_err());
        assert!(local_today(now, None).is_ok());
    }
}
