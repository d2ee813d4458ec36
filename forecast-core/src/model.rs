use std::{fmt, str::FromStr};

use chrono::{Days, Local, NaiveDate};
use reqwest::Url;
use serde_json::{Map, Value};

use crate::error::ForecastError;

/// One flattened hour: every field of the provider's hour object plus `date` and `time`.
pub type HourlyRecord = Map<String, Value>;

/// Hourly records in provider order (day order, then hour order within a day).
pub type ForecastResult = Vec<HourlyRecord>;

/// End of the requested range: a concrete date or a number of days after the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastEnd {
    Date(NaiveDate),
    /// Days added to the start date. Negative offsets are allowed.
    Offset(i64),
}

impl ForecastEnd {
    /// Resolve to a calendar date relative to `start`.
    pub fn resolve(self, start: NaiveDate) -> Result<NaiveDate, ForecastError> {
        match self {
            ForecastEnd::Date(date) => Ok(date),
            ForecastEnd::Offset(days) => {
                let resolved = if days >= 0 {
                    start.checked_add_days(Days::new(days.unsigned_abs()))
                } else {
                    start.checked_sub_days(Days::new(days.unsigned_abs()))
                };

                resolved.ok_or_else(|| {
                    ForecastError::InvalidDateRange(format!(
                        "{start} {days:+} days is outside the supported calendar"
                    ))
                })
            }
        }
    }
}

impl From<NaiveDate> for ForecastEnd {
    fn from(date: NaiveDate) -> Self {
        ForecastEnd::Date(date)
    }
}

impl From<i64> for ForecastEnd {
    fn from(days: i64) -> Self {
        ForecastEnd::Offset(days)
    }
}

impl FromStr for ForecastEnd {
    type Err = ForecastError;

    /// Accepts `YYYY-MM-DD` or a signed day offset such as `5` or `-2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(days) = s.parse::<i64>() {
            return Ok(ForecastEnd::Offset(days));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(ForecastEnd::Date).map_err(|_| {
            ForecastError::InvalidDateRange(format!(
                "'{s}' is neither a YYYY-MM-DD date nor a day offset"
            ))
        })
    }
}

impl fmt::Display for ForecastEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastEnd::Date(date) => write!(f, "{date}"),
            ForecastEnd::Offset(days) => write!(f, "{days:+} days"),
        }
    }
}

/// Requested range. The start defaults to today, evaluated when the range is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: ForecastEnd,
}

impl DateRange {
    /// `start = None` means "today" at the moment of this call.
    pub fn new(end: impl Into<ForecastEnd>, start: Option<NaiveDate>) -> Self {
        Self {
            start: start.unwrap_or_else(|| Local::now().date_naive()),
            end: end.into(),
        }
    }

    /// Concrete `(start, end)` dates.
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate), ForecastError> {
        Ok((self.start, self.end.resolve(self.start)?))
    }
}

/// A fully built request target, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn offset_is_added_to_start_not_today() {
        let end = ForecastEnd::Offset(5).resolve(date(2024, 1, 1)).unwrap();
        assert_eq!(end, date(2024, 1, 6));
    }

    #[test]
    fn negative_offset_resolves_into_the_past() {
        let end = ForecastEnd::Offset(-3).resolve(date(2024, 3, 1)).unwrap();
        assert_eq!(end, date(2024, 2, 27));
    }

    #[test]
    fn explicit_date_ignores_start() {
        let end = ForecastEnd::Date(date(2024, 5, 5)).resolve(date(2030, 1, 1)).unwrap();
        assert_eq!(end, date(2024, 5, 5));
    }

    #[test]
    fn overflowing_offset_is_rejected() {
        let err = ForecastEnd::Offset(i64::MAX).resolve(date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDateRange(_)));
    }

    #[test]
    fn parse_offset_and_date() {
        assert_eq!("5".parse::<ForecastEnd>().unwrap(), ForecastEnd::Offset(5));
        assert_eq!("-2".parse::<ForecastEnd>().unwrap(), ForecastEnd::Offset(-2));
        assert_eq!(
            "2024-01-06".parse::<ForecastEnd>().unwrap(),
            ForecastEnd::Date(date(2024, 1, 6))
        );
        assert!("next tuesday".parse::<ForecastEnd>().is_err());
    }

    #[test]
    fn range_without_start_uses_today() {
        let today = Local::now().date_naive();
        let range = DateRange::new(1_i64, None);
        // Tolerate the test running across midnight.
        assert!(range.start == today || range.start == today.succ_opt().unwrap());
    }

    #[test]
    fn offset_and_date_ranges_resolve_identically() {
        let by_offset = DateRange::new(5_i64, Some(date(2024, 1, 1))).resolve().unwrap();
        let by_date = DateRange::new(date(2024, 1, 6), Some(date(2024, 1, 1))).resolve().unwrap();
        assert_eq!(by_offset, by_date);
    }
}
