use chrono::prelude::*;
use indexmap::set::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PeriodError, PeriodResult};

/// Used to remove candidate segments from a segmentation.
pub trait ExcludeRule {
    /// Returns whether the segment starting at `candidate_start` must be dropped.
    fn applies(&self, candidate_start: &NaiveDateTime) -> bool;
}

/// Build a sorted, de-duplicated number set, validating every value against `range`.
fn validated_set(
    values: Vec<u32>,
    range: std::ops::RangeInclusive<u32>,
    name: &str,
) -> PeriodResult<IndexSet<u32>> {
    if values.is_empty() {
        return Err(PeriodError::InvalidExclusionRule(format!(
            "at least one {name} number is required"
        )));
    }
    if let Some(bad) = values.iter().find(|v| !range.contains(*v)) {
        return Err(PeriodError::InvalidExclusionRule(format!(
            "invalid {name} number {bad} in {values:?} [{}, ..., {}]",
            range.start(),
            range.end()
        )));
    }
    Ok(values.into_iter().sorted().dedup().collect())
}

/// Excludes segments starting in any of the given calendar months.
///
/// # Examples
/// ```rust
/// # use dateperiods::periods::{ExcludeMonth, ExcludeRule, ndt};
/// let rule = ExcludeMonth::try_new(vec![9, 5, 6, 7, 8]).unwrap();
/// assert_eq!(rule.months(), vec![5, 6, 7, 8, 9]);
/// assert!(rule.applies(&ndt(2015, 6, 10)));
/// assert!(!rule.applies(&ndt(2015, 10, 1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ExcludeMonth {
    months: IndexSet<u32>,
}

impl ExcludeMonth {
    /// Create a rule from month numbers in [1, 12].
    pub fn try_new(months: Vec<u32>) -> PeriodResult<Self> {
        Ok(ExcludeMonth {
            months: validated_set(months, 1..=12, "month")?,
        })
    }

    /// The excluded month numbers in ascending order.
    pub fn months(&self) -> Vec<u32> {
        self.months.iter().copied().collect()
    }
}

impl TryFrom<Vec<u32>> for ExcludeMonth {
    type Error = PeriodError;
    fn try_from(months: Vec<u32>) -> PeriodResult<Self> {
        ExcludeMonth::try_new(months)
    }
}

impl From<ExcludeMonth> for Vec<u32> {
    fn from(item: ExcludeMonth) -> Self {
        item.months()
    }
}

impl ExcludeRule for ExcludeMonth {
    fn applies(&self, candidate_start: &NaiveDateTime) -> bool {
        self.months.contains(&candidate_start.month())
    }
}

impl fmt::Display for ExcludeMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExcludeMonth: [{}]", self.months.iter().join(", "))
    }
}

/// Excludes segments starting on any of the given ISO weekdays (1=Mon, .., 7=Sun).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ExcludeWeekday {
    weekdays: IndexSet<u32>,
}

impl ExcludeWeekday {
    /// Create a rule from ISO weekday numbers in [1, 7].
    pub fn try_new(weekdays: Vec<u32>) -> PeriodResult<Self> {
        Ok(ExcludeWeekday {
            weekdays: validated_set(weekdays, 1..=7, "weekday")?,
        })
    }

    /// The excluded ISO weekday numbers in ascending order.
    pub fn weekdays(&self) -> Vec<u32> {
        self.weekdays.iter().copied().collect()
    }
}

impl TryFrom<Vec<u32>> for ExcludeWeekday {
    type Error = PeriodError;
    fn try_from(weekdays: Vec<u32>) -> PeriodResult<Self> {
        ExcludeWeekday::try_new(weekdays)
    }
}

impl From<ExcludeWeekday> for Vec<u32> {
    fn from(item: ExcludeWeekday) -> Self {
        item.weekdays()
    }
}

impl ExcludeRule for ExcludeWeekday {
    fn applies(&self, candidate_start: &NaiveDateTime) -> bool {
        self.weekdays
            .contains(&candidate_start.weekday().number_from_monday())
    }
}

impl fmt::Display for ExcludeWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExcludeWeekday: [{}]", self.weekdays.iter().join(", "))
    }
}

/// Container for exclusion rule types.
///
/// Serializes externally tagged, e.g. `{"Month":[5,9]}` or `{"Weekday":[6,7]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exclusion {
    Month(ExcludeMonth),
    Weekday(ExcludeWeekday),
}

impl From<ExcludeMonth> for Exclusion {
    fn from(item: ExcludeMonth) -> Self {
        Exclusion::Month(item)
    }
}

impl From<ExcludeWeekday> for Exclusion {
    fn from(item: ExcludeWeekday) -> Self {
        Exclusion::Weekday(item)
    }
}

impl ExcludeRule for Exclusion {
    fn applies(&self, candidate_start: &NaiveDateTime) -> bool {
        match self {
            Exclusion::Month(r) => r.applies(candidate_start),
            Exclusion::Weekday(r) => r.applies(candidate_start),
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Month(r) => fmt::Display::fmt(r, f),
            Exclusion::Weekday(r) => fmt::Display::fmt(r, f),
        }
    }
}

/// Whether any rule of a list applies to a candidate segment start.
pub(crate) fn any_applies<R: ExcludeRule>(rules: &[R], candidate_start: &NaiveDateTime) -> bool {
    rules.iter().any(|r| r.applies(candidate_start))
}
