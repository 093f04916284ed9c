use chrono::prelude::*;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PeriodError, PeriodResult};

/// Create a `NaiveDateTime` with default null time.
///
/// Panics if date values are invalid.
pub fn ndt(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("`year`, `month` `day` are invalid.")
        .and_time(NaiveTime::MIN)
}

/// Return the last day of the month for a given month and year.
///
/// Returns `None` if the month is not in [1, 12].
pub fn get_eom(year: i32, month: u32) -> Option<NaiveDate> {
    let mut day = 31;
    let mut date = NaiveDate::from_ymd_opt(year, month, day);
    while date.is_none() && day > 28 {
        day -= 1;
        date = NaiveDate::from_ymd_opt(year, month, day);
    }
    date
}

/// Test whether a given date is the last day of its month.
pub fn is_eom(date: &NaiveDate) -> bool {
    get_eom(date.year(), date.month()) == Some(*date)
}

/// The first microsecond of a calendar day.
pub fn start_of_day(date: &NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The last microsecond of a calendar day, i.e. 23:59:59.999999.
pub fn end_of_day(date: &NaiveDate) -> NaiveDateTime {
    // NaiveTime arithmetic wraps around midnight.
    date.and_time(NaiveTime::MIN - one_microsecond())
}

pub(crate) fn one_microsecond() -> TimeDelta {
    TimeDelta::microseconds(1)
}

/// Render an instant as `YYYY-MM-DD{sep}HH:MM:SS[.ffffff]`.
///
/// Fractional seconds are only shown when the microsecond part is non-zero.
pub(crate) fn render_instant(instant: &NaiveDateTime, sep: &str) -> String {
    let fmt = if instant.nanosecond() / 1_000 == 0 {
        format!("%Y-%m-%d{sep}%H:%M:%S")
    } else {
        format!("%Y-%m-%d{sep}%H:%M:%S%.6f")
    };
    instant.format(&fmt).to_string()
}

fn truncate_to_micros(instant: NaiveDateTime) -> NaiveDateTime {
    let excess = instant.nanosecond() % 1_000;
    instant - TimeDelta::nanoseconds(excess as i64)
}

/// Marks a date as the beginning or the end of a time coverage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Time coverage start.
    Tcs,
    /// Time coverage end.
    Tce,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Tcs => write!(f, "tcs"),
            Role::Tce => write!(f, "tce"),
        }
    }
}

/// The granularity of the fields explicitly given in a date input.
///
/// Variants are ordered from coarse to fine, so the finer of two levels is the `max`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DefinitionLevel {
    /// Only the year was given.
    Year,
    /// Year and month were given.
    Month,
    /// A full calendar date (or datetime) was given.
    Day,
}

impl DefinitionLevel {
    /// The ISO 8601 duration of one unit of this level.
    pub fn isoformat(&self) -> &'static str {
        match self {
            DefinitionLevel::Year => "P1Y",
            DefinitionLevel::Month => "P1M",
            DefinitionLevel::Day => "P1D",
        }
    }
}

/// Raw input accepted as the definition of a period boundary.
///
/// Deserializes from a JSON integer array or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateSpec {
    /// `year[, month[, day[, hour[, minute[, second]]]]]`.
    Ints(Vec<i32>),
    /// ISO 8601 `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
    Text(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A calendar datetime whose time of day is kept verbatim.
    DateTime(NaiveDateTime),
}

impl From<&str> for DateSpec {
    fn from(item: &str) -> Self {
        DateSpec::Text(item.to_string())
    }
}

impl From<String> for DateSpec {
    fn from(item: String) -> Self {
        DateSpec::Text(item)
    }
}

impl From<Vec<i32>> for DateSpec {
    fn from(item: Vec<i32>) -> Self {
        DateSpec::Ints(item)
    }
}

impl<const N: usize> From<[i32; N]> for DateSpec {
    fn from(item: [i32; N]) -> Self {
        DateSpec::Ints(item.to_vec())
    }
}

impl From<NaiveDate> for DateSpec {
    fn from(item: NaiveDate) -> Self {
        DateSpec::Date(item)
    }
}

impl From<NaiveDateTime> for DateSpec {
    fn from(item: NaiveDateTime) -> Self {
        DateSpec::DateTime(item)
    }
}

/// The fields of a date input before auto-completion.
#[derive(Debug)]
struct DateFields {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<NaiveTime>,
}

impl DateFields {
    fn from_datetime(dt: &NaiveDateTime) -> Self {
        DateFields {
            year: dt.year(),
            month: Some(dt.month()),
            day: Some(dt.day()),
            time: Some(truncate_to_micros(*dt).time()),
        }
    }

    fn from_date(d: &NaiveDate) -> Self {
        DateFields {
            year: d.year(),
            month: Some(d.month()),
            day: Some(d.day()),
            time: None,
        }
    }

    fn from_ints(ints: &[i32]) -> PeriodResult<Self> {
        if ints.is_empty() || ints.len() > 6 {
            return Err(PeriodError::date_spec(format!(
                "{:?} -> (year, [month], [day], [hour], [minute], [second])",
                ints
            )));
        }
        let unsigned = |value: i32, name: &str| -> PeriodResult<u32> {
            u32::try_from(value)
                .map_err(|_| PeriodError::date_spec(format!("negative {name} in {ints:?}")))
        };
        let month = ints.get(1).map(|v| unsigned(*v, "month")).transpose()?;
        let day = ints.get(2).map(|v| unsigned(*v, "day")).transpose()?;
        let time = if ints.len() > 3 {
            let hour = unsigned(ints[3], "hour")?;
            let minute = unsigned(*ints.get(4).unwrap_or(&0), "minute")?;
            let second = unsigned(*ints.get(5).unwrap_or(&0), "second")?;
            Some(NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
                PeriodError::date_spec(format!("time out of range in {ints:?}"))
            })?)
        } else {
            None
        };
        Ok(DateFields {
            year: ints[0],
            month,
            day,
            time,
        })
    }

    fn from_text(text: &str) -> PeriodResult<Self> {
        let text = text.trim();
        let invalid = || PeriodError::date_spec(format!("{text} -> yyyy[-mm[-dd[Thh:mm:ss]]]"));
        if !text.get(..4).is_some_and(is_valid_year) {
            return Err(invalid());
        }
        if text.len() > 10 {
            let dt = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|_| invalid())?;
            return Ok(DateFields::from_datetime(&dt));
        }
        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() > 3 || parts[0].len() != 4 {
            return Err(invalid());
        }
        let mut fields = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            if i > 0 && (part.len() != 2 || !part.chars().all(|c| c.is_ascii_digit())) {
                return Err(invalid());
            }
            fields.push(part.parse::<i32>().map_err(|_| invalid())?);
        }
        DateFields::from_ints(&fields)
    }

    fn definition_level(&self) -> DefinitionLevel {
        match (self.month, self.day) {
            (None, _) => DefinitionLevel::Year,
            (Some(_), None) => DefinitionLevel::Month,
            (Some(_), Some(_)) => DefinitionLevel::Day,
        }
    }

    /// Auto-complete the missing fields as the beginning or the end of the given unit.
    fn resolve(&self, role: Role) -> PeriodResult<NaiveDateTime> {
        let month = self.month.unwrap_or(match role {
            Role::Tcs => 1,
            Role::Tce => 12,
        });
        if !(1..=12).contains(&month) {
            return Err(PeriodError::date_spec(format!(
                "month {month} out of range [1, ..., 12]"
            )));
        }
        let day = match (self.day, role) {
            (Some(d), _) => d,
            (None, Role::Tcs) => 1,
            (None, Role::Tce) => get_eom(self.year, month)
                .map(|d| d.day())
                .ok_or_else(|| {
                    PeriodError::date_spec(format!("year {} out of range", self.year))
                })?,
        };
        let date = NaiveDate::from_ymd_opt(self.year, month, day).ok_or_else(|| {
            PeriodError::date_spec(format!("Invalid date: {}, {}, {}", self.year, month, day))
        })?;
        Ok(match (self.time, role) {
            (Some(time), _) => date.and_time(time),
            (None, Role::Tcs) => start_of_day(&date),
            (None, Role::Tce) => end_of_day(&date),
        })
    }
}

fn is_valid_year(year: &str) -> bool {
    year.starts_with(['1', '2']) && year.chars().all(|c| c.is_ascii_digit())
}

/// A period boundary: a start or end instant with the granularity of its original input.
///
/// Partial inputs are auto-completed depending on the [`Role`]:
///
/// - a missing day becomes the first (start) or last (end) day of the month,
/// - a missing month and day become January 1st (start) or December 31st (end),
/// - a missing time of day becomes 00:00:00 (start) or 23:59:59.999999 (end).
///
/// Inputs with an explicit time of day keep it verbatim.
///
/// Serializes as its [`DateDefinitionConfig`] and is re-resolved on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateDefinitionConfig", into = "DateDefinitionConfig")]
pub struct DateDefinition {
    instant: NaiveDateTime,
    role: Role,
    definition_level: DefinitionLevel,
}

impl DateDefinition {
    /// Create a new [`DateDefinition`] from any supported date input.
    ///
    /// # Examples
    /// ```rust
    /// # use dateperiods::periods::{DateDefinition, Role, DefinitionLevel, ndt};
    /// let tce = DateDefinition::try_new([2024, 2], Role::Tce).unwrap();
    /// assert_eq!(tce.date(), ndt(2024, 2, 29).date());
    /// assert_eq!(tce.definition_level(), DefinitionLevel::Month);
    /// assert_eq!(tce.isoformat(), "2024-02-29T23:59:59.999999");
    /// ```
    pub fn try_new(spec: impl Into<DateSpec>, role: Role) -> PeriodResult<Self> {
        let fields = match spec.into() {
            DateSpec::Ints(ints) => DateFields::from_ints(&ints)?,
            DateSpec::Text(text) => DateFields::from_text(&text)?,
            DateSpec::Date(date) => DateFields::from_date(&date),
            DateSpec::DateTime(dt) => DateFields::from_datetime(&dt),
        };
        Ok(DateDefinition {
            instant: fields.resolve(role)?,
            role,
            definition_level: fields.definition_level(),
        })
    }

    /// Wrap an already resolved instant without any normalization.
    pub fn from_instant(instant: NaiveDateTime, role: Role) -> Self {
        DateDefinition {
            instant: truncate_to_micros(instant),
            role,
            definition_level: DefinitionLevel::Day,
        }
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }

    pub fn date(&self) -> NaiveDate {
        self.instant.date()
    }

    pub fn year(&self) -> i32 {
        self.instant.year()
    }

    pub fn month(&self) -> u32 {
        self.instant.month()
    }

    pub fn day(&self) -> u32 {
        self.instant.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.instant.weekday()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn definition_level(&self) -> DefinitionLevel {
        self.definition_level
    }

    /// Whether this date marks the beginning of a time coverage.
    pub fn is_tcs(&self) -> bool {
        self.role == Role::Tcs
    }

    /// Whether this date marks the end of a time coverage.
    pub fn is_tce(&self) -> bool {
        self.role == Role::Tce
    }

    pub fn is_monday(&self) -> bool {
        self.weekday() == Weekday::Mon
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday() == Weekday::Sun
    }

    pub fn is_first_day_of_month(&self) -> bool {
        self.day() == 1
    }

    pub fn is_last_day_of_month(&self) -> bool {
        is_eom(&self.date())
    }

    /// The instant in seconds since 1970-01-01 00:00:00, with microsecond resolution.
    pub fn datenum(&self) -> f64 {
        self.instant.and_utc().timestamp_micros() as f64 / 1e6
    }

    /// The instant as `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
    pub fn isoformat(&self) -> String {
        render_instant(&self.instant, "T")
    }
}

/// The serialized form of a [`DateDefinition`], e.g. `{"spec": [2018, 4], "role": "Tce"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateDefinitionConfig {
    pub spec: DateSpec,
    pub role: Role,
}

impl TryFrom<DateDefinitionConfig> for DateDefinition {
    type Error = PeriodError;
    fn try_from(config: DateDefinitionConfig) -> PeriodResult<Self> {
        DateDefinition::try_new(config.spec, config.role)
    }
}

impl From<DateDefinition> for DateDefinitionConfig {
    fn from(item: DateDefinition) -> Self {
        DateDefinitionConfig {
            spec: DateSpec::from(&item),
            role: item.role,
        }
    }
}

impl From<&DateDefinition> for DateSpec {
    /// The most compact input that resolves back to the same definition.
    fn from(item: &DateDefinition) -> Self {
        let canonical = match item.role {
            Role::Tcs => start_of_day(&item.date()),
            Role::Tce => end_of_day(&item.date()),
        };
        match item.definition_level {
            DefinitionLevel::Year => DateSpec::Ints(vec![item.year()]),
            DefinitionLevel::Month => DateSpec::Ints(vec![item.year(), item.month() as i32]),
            DefinitionLevel::Day if item.instant == canonical => {
                DateSpec::Ints(vec![item.year(), item.month() as i32, item.day() as i32])
            }
            DefinitionLevel::Day => DateSpec::DateTime(item.instant),
        }
    }
}

impl fmt::Display for DateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_instant(&self.instant, " "))
    }
}
