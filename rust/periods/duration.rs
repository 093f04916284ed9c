use chrono::prelude::*;
use chrono::{Months, TimeDelta};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PeriodError, PeriodResult};
use crate::periods::definition::{is_eom, one_microsecond};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// Classifier of the span between two period boundaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationType {
    /// A single calendar day.
    Day,
    /// Monday through Sunday of one ISO week.
    IsoWeek,
    /// First through last day of one calendar month.
    Month,
    /// January 1st through December 31st of one calendar year.
    Year,
    /// Any other span.
    Custom,
}

impl fmt::Display for DurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DurationType::Day => "day",
            DurationType::IsoWeek => "isoweek",
            DurationType::Month => "month",
            DurationType::Year => "year",
            DurationType::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// The calendar-aware duration of a period.
///
/// The span measured is `[tcs, tce + 1µs)`, i.e. the end boundary is inclusive, and it is
/// decomposed into whole years, months and days plus a sub-day remainder, anchored at `tcs`.
/// The decomposition is exact: [`DateDuration::apply`] on `tcs` yields `tce + 1µs`.
///
/// A duration is serializable for reporting but is never deserialized: it is always derived
/// from the boundaries of a [`DatePeriod`](crate::periods::DatePeriod).
///
/// # Examples
/// ```rust
/// # use dateperiods::periods::{DateDuration, DurationType, ndt};
/// # use chrono::TimeDelta;
/// let tcs = ndt(2020, 10, 1);
/// let tce = ndt(2021, 5, 1) - TimeDelta::microseconds(1);
/// let duration = DateDuration::try_new(&tcs, &tce).unwrap();
/// assert_eq!(duration.isoformat(), "P7M");
/// assert_eq!(duration.duration_type(), DurationType::Custom);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateDuration {
    years: u32,
    months: u32,
    days: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
    microseconds: u32,
    total_days: i64,
    total_microseconds: i64,
    duration_type: DurationType,
}

impl DateDuration {
    /// Compute the duration between two inclusive boundaries.
    pub fn try_new(tcs: &NaiveDateTime, tce: &NaiveDateTime) -> PeriodResult<Self> {
        if tce < tcs {
            return Err(PeriodError::InvalidPeriod {
                tcs: *tcs,
                tce: *tce,
            });
        }
        let end = *tce + one_microsecond();
        let (total_months, anchor) = decompose_months(tcs, &end);
        let remainder = end - anchor;
        let days = remainder.num_days();
        let rest = (remainder - TimeDelta::days(days))
            .num_microseconds()
            .unwrap_or_default();

        let mut duration = DateDuration {
            years: total_months / 12,
            months: total_months % 12,
            days: days as u32,
            hours: (rest / MICROS_PER_HOUR) as u32,
            minutes: (rest % MICROS_PER_HOUR / MICROS_PER_MINUTE) as u32,
            seconds: (rest % MICROS_PER_MINUTE / MICROS_PER_SECOND) as u32,
            microseconds: (rest % MICROS_PER_SECOND) as u32,
            total_days: (tce.date() - tcs.date()).num_days() + 1,
            total_microseconds: (end - *tcs).num_microseconds().unwrap_or(i64::MAX),
            duration_type: DurationType::Custom,
        };
        duration.duration_type = duration.classify(tcs, tce);
        Ok(duration)
    }

    fn classify(&self, tcs: &NaiveDateTime, tce: &NaiveDateTime) -> DurationType {
        let ymd = (self.years, self.months, self.days);
        if self.total_days == 1 {
            DurationType::Day
        } else if self.total_days == 7 && tcs.weekday() == Weekday::Mon {
            DurationType::IsoWeek
        } else if ymd == (0, 1, 0) && tcs.day() == 1 && is_eom(&tce.date()) {
            DurationType::Month
        } else if ymd == (1, 0, 0)
            && (tcs.month(), tcs.day()) == (1, 1)
            && (tce.month(), tce.day()) == (12, 31)
        {
            DurationType::Year
        } else {
            DurationType::Custom
        }
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn microseconds(&self) -> u32 {
        self.microseconds
    }

    /// Number of calendar days touched by the period (1 if start and end share a day).
    pub fn total_days(&self) -> i64 {
        self.total_days
    }

    /// Length of the period in seconds, including the final microsecond of the end boundary.
    pub fn total_seconds(&self) -> f64 {
        self.total_microseconds as f64 / MICROS_PER_SECOND as f64
    }

    pub fn duration_type(&self) -> DurationType {
        self.duration_type
    }

    pub fn is_day(&self) -> bool {
        self.duration_type == DurationType::Day
    }

    pub fn is_isoweek(&self) -> bool {
        self.duration_type == DurationType::IsoWeek
    }

    pub fn is_month(&self) -> bool {
        self.duration_type == DurationType::Month
    }

    pub fn is_year(&self) -> bool {
        self.duration_type == DurationType::Year
    }

    fn is_whole_days(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0 && self.microseconds == 0
    }

    /// Add this duration to an instant.
    ///
    /// Months are added in a single step from `instant` (clamping to the end of shorter
    /// months), followed by the days and the sub-day remainder. Returns `None` on overflow.
    pub fn apply(&self, instant: &NaiveDateTime) -> Option<NaiveDateTime> {
        let rest = TimeDelta::hours(self.hours as i64)
            + TimeDelta::minutes(self.minutes as i64)
            + TimeDelta::seconds(self.seconds as i64)
            + TimeDelta::microseconds(self.microseconds as i64);
        instant
            .checked_add_months(Months::new(self.years * 12 + self.months))?
            .checked_add_signed(TimeDelta::days(self.days as i64) + rest)
    }

    /// The ISO 8601 duration string, e.g. `P1Y2M3D` or `PT12H`.
    ///
    /// Only non-zero components are written; a zero duration renders as `P0D`.
    pub fn isoformat(&self) -> String {
        let mut iso = String::from("P");
        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value > 0 {
                iso.push_str(&format!("{value}{unit}"));
            }
        }
        if !self.is_whole_days() {
            iso.push('T');
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M')] {
                if value > 0 {
                    iso.push_str(&format!("{value}{unit}"));
                }
            }
            if self.microseconds > 0 {
                iso.push_str(&format!("{}.{:06}S", self.seconds, self.microseconds));
            } else if self.seconds > 0 {
                iso.push_str(&format!("{}S", self.seconds));
            }
        }
        if iso.len() == 1 {
            iso.push_str("0D");
        }
        iso
    }
}

impl fmt::Display for DateDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.isoformat())
    }
}

fn add_months(instant: &NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    instant.checked_add_months(Months::new(months))
}

/// Return the largest number of whole months that can be added to `start` without passing
/// `end`, together with the resulting anchor date.
///
/// The calendar month difference is an upper bound, so stepping it down already reaches the
/// fixed point. The carry loop that follows is a bounded guard and does not move the anchor
/// for any valid pair of instants.
fn decompose_months(start: &NaiveDateTime, end: &NaiveDateTime) -> (u32, NaiveDateTime) {
    let estimate = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut months = u32::try_from(estimate).unwrap_or(0);
    while months > 0 && add_months(start, months).map_or(true, |d| d > *end) {
        months -= 1;
    }
    let mut anchor = add_months(start, months).unwrap_or(*start);

    // Carry whole months out of the remaining days until a fixed point is reached. Each
    // iteration consumes one month of the remaining span, so the loop is bounded by it.
    let bound = months + 2;
    for _ in 0..bound {
        match add_months(start, months + 1) {
            Some(next) if next <= *end => {
                trace!("carrying day remainder into month {} from {}", months + 1, start);
                months += 1;
                anchor = next;
            }
            _ => break,
        }
    }
    (months, anchor)
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::definition::{end_of_day, ndt};

    fn eod(year: i32, month: u32, day: u32) -> NaiveDateTime {
        end_of_day(&ndt(year, month, day).date())
    }

    fn duration(tcs: NaiveDateTime, tce: NaiveDateTime) -> DateDuration {
        DateDuration::try_new(&tcs, &tce).unwrap()
    }

    #[test]
    fn test_isoformat_and_type() {
        let options: Vec<(NaiveDateTime, NaiveDateTime, &str, DurationType)> = vec![
            (ndt(2018, 1, 1), eod(2018, 12, 31), "P1Y", DurationType::Year),
            (ndt(2018, 10, 1), eod(2020, 9, 30), "P2Y", DurationType::Custom),
            (ndt(2018, 4, 1), eod(2018, 4, 30), "P1M", DurationType::Month),
            (ndt(2018, 10, 1), eod(2019, 4, 30), "P7M", DurationType::Custom),
            (ndt(2020, 10, 1), eod(2021, 4, 30), "P7M", DurationType::Custom),
            (ndt(2018, 4, 2), eod(2018, 4, 8), "P7D", DurationType::IsoWeek),
            (ndt(2018, 4, 3), eod(2018, 4, 9), "P7D", DurationType::Custom),
            (ndt(2018, 4, 1), eod(2018, 4, 1), "P1D", DurationType::Day),
            (ndt(2018, 4, 1), eod(2018, 4, 2), "P2D", DurationType::Custom),
            (ndt(2018, 4, 15), eod(2018, 5, 15), "P1M1D", DurationType::Custom),
            (ndt(2020, 1, 31), eod(2020, 2, 29), "P1M1D", DurationType::Custom),
            (ndt(2018, 3, 1), eod(2019, 5, 31), "P1Y3M", DurationType::Custom),
        ];
        for option in options {
            let d = duration(option.0, option.1);
            assert_eq!(d.isoformat(), option.2, "{} - {}", option.0, option.1);
            assert_eq!(d.duration_type(), option.3, "{} - {}", option.0, option.1);
        }
    }

    #[test]
    fn test_sub_day_remainder() {
        let tcs = ndt(2018, 4, 1) + TimeDelta::hours(6);
        let tce = ndt(2018, 4, 2) + TimeDelta::hours(18) - one_microsecond();
        let d = duration(tcs, tce);
        assert_eq!(d.isoformat(), "P1DT12H");
        assert_eq!(d.duration_type(), DurationType::Custom);

        let d = duration(tcs, tcs);
        assert_eq!(d.isoformat(), "PT0.000001S");
        assert_eq!(d.total_days(), 1);
    }

    #[test]
    fn test_zero_duration_isoformat() {
        let d = DateDuration {
            years: 0,
            months: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            microseconds: 0,
            total_days: 0,
            total_microseconds: 0,
            duration_type: DurationType::Custom,
        };
        assert_eq!(d.isoformat(), "P0D");
    }

    #[test]
    fn test_apply_round_trip() {
        let options: Vec<(NaiveDateTime, NaiveDateTime)> = vec![
            (ndt(2020, 1, 31), eod(2020, 2, 29)),
            (ndt(2019, 1, 31), eod(2019, 3, 30)),
            (ndt(2020, 2, 29), eod(2021, 2, 27)),
            (ndt(2018, 4, 15), eod(2023, 12, 1)),
            (ndt(2020, 12, 31), eod(2021, 1, 30)),
        ];
        for (tcs, tce) in options {
            let d = duration(tcs, tce);
            assert_eq!(d.apply(&tcs).unwrap(), tce + one_microsecond());
        }
    }

    #[test]
    fn test_total_days_and_seconds() {
        let d = duration(ndt(2018, 4, 1), eod(2018, 4, 30));
        assert_eq!(d.total_days(), 30);
        assert_eq!(d.total_seconds(), 30.0 * 86400.0);
    }

    #[test]
    fn test_same_date_with_time_is_day() {
        let tcs = ndt(2018, 4, 1) + TimeDelta::hours(6);
        let tce = ndt(2018, 4, 1) + TimeDelta::hours(18);
        let d = duration(tcs, tce);
        assert_eq!(d.total_days(), 1);
        assert_eq!(d.duration_type(), DurationType::Day);
        assert_eq!(d.isoformat(), "PT12H0.000001S");

        // under 24 hours, but spread over two dates
        let d = duration(tcs, ndt(2018, 4, 2) + TimeDelta::hours(5));
        assert_eq!(d.total_days(), 2);
        assert_eq!(d.duration_type(), DurationType::Custom);

        // Monday morning till Sunday noon touches one isoweek
        let d = duration(
            ndt(2018, 4, 2) + TimeDelta::hours(6),
            ndt(2018, 4, 8) + TimeDelta::hours(12),
        );
        assert_eq!(d.duration_type(), DurationType::IsoWeek);
    }

    #[test]
    fn test_decompose_months_steps_down() {
        // adding two months to Jan 31st clamps to Mar 31st, beyond the exclusive end
        let end = eod(2019, 3, 29) + one_microsecond();
        assert_eq!(
            decompose_months(&ndt(2019, 1, 31), &end),
            (1, ndt(2019, 2, 28))
        );
        let d = duration(ndt(2019, 1, 31), eod(2019, 3, 29));
        assert_eq!(d.isoformat(), "P1M30D");

        let end = eod(2018, 12, 31) + one_microsecond();
        assert_eq!(
            decompose_months(&ndt(2018, 1, 1), &end),
            (12, ndt(2019, 1, 1))
        );
    }

    #[test]
    fn test_invalid_order() {
        let result = DateDuration::try_new(&ndt(2018, 4, 2), &ndt(2018, 4, 1));
        assert!(matches!(result, Err(PeriodError::InvalidPeriod { .. })));
    }
}
