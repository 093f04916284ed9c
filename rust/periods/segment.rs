use chrono::prelude::*;
use chrono::Days;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PeriodError;
use crate::periods::definition::{end_of_day, get_eom, start_of_day};

/// The calendar unit used to split a period into segments.
///
/// # Examples
/// ```rust
/// # use dateperiods::periods::{SegmentDuration, ndt};
/// let unit: SegmentDuration = "Monthly".parse().unwrap();
/// assert_eq!(unit, SegmentDuration::Month);
/// assert_eq!(unit.unit_end(&ndt(2024, 2, 10)).date(), ndt(2024, 2, 29).date());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentDuration {
    Day,
    IsoWeek,
    Month,
    Year,
}

impl FromStr for SegmentDuration {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "p1d" => Ok(SegmentDuration::Day),
            "isoweek" | "isoweekly" | "p7d" => Ok(SegmentDuration::IsoWeek),
            "month" | "monthly" | "p1m" => Ok(SegmentDuration::Month),
            "year" | "yearly" | "p1y" => Ok(SegmentDuration::Year),
            _ => Err(PeriodError::UnknownSegmentDuration(s.to_string())),
        }
    }
}

impl fmt::Display for SegmentDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentDuration::Day => "day",
            SegmentDuration::IsoWeek => "isoweek",
            SegmentDuration::Month => "month",
            SegmentDuration::Year => "year",
        };
        write!(f, "{}", name)
    }
}

impl SegmentDuration {
    /// The ISO 8601 duration of one unit.
    pub fn isoformat(&self) -> &'static str {
        match self {
            SegmentDuration::Day => "P1D",
            SegmentDuration::IsoWeek => "P7D",
            SegmentDuration::Month => "P1M",
            SegmentDuration::Year => "P1Y",
        }
    }

    /// Move an instant to the start of the first segment containing it.
    ///
    /// Only isoweeks are aligned, to midnight of the Monday of the week. Other units start
    /// segmenting at the instant itself.
    pub fn align(&self, instant: &NaiveDateTime) -> NaiveDateTime {
        match self {
            SegmentDuration::IsoWeek => {
                let offset = instant.weekday().num_days_from_monday() as u64;
                let monday = instant
                    .date()
                    .checked_sub_days(Days::new(offset))
                    .unwrap_or(NaiveDate::MIN);
                start_of_day(&monday)
            }
            _ => *instant,
        }
    }

    /// The last microsecond of the unit containing `instant`.
    pub fn unit_end(&self, instant: &NaiveDateTime) -> NaiveDateTime {
        let date = instant.date();
        let last_day = match self {
            SegmentDuration::Day => date,
            SegmentDuration::IsoWeek => {
                let offset = instant.weekday().num_days_from_sunday() as u64;
                date.checked_add_days(Days::new((7 - offset) % 7))
                    .unwrap_or(NaiveDate::MAX)
            }
            SegmentDuration::Month => get_eom(date.year(), date.month()).unwrap_or(date),
            SegmentDuration::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
        };
        end_of_day(&last_day)
    }
}
