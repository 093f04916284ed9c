use chrono::prelude::*;
use chrono::{DurationRound, TimeDelta};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use crate::error::{PeriodError, PeriodResult};
use crate::periods::definition::{DateDefinition, DateSpec, DefinitionLevel, Role};
use crate::periods::duration::DateDuration;
use crate::periods::exclude::Exclusion;
use crate::periods::iterator::PeriodIterator;
use crate::periods::segment::SegmentDuration;

const ID_FORMAT: &str = "%Y%m%dT%H%M%S";

/// The serialized form of a [`DatePeriod`].
///
/// Boundaries accept any [`DateSpec`] representation, so a period can be declared as
/// `{"tcs": [2020, 10], "tce": "2021-04"}`. A missing `tce` is derived from `tcs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatePeriodConfig {
    pub tcs: DateSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tce: Option<DateSpec>,
    #[serde(default)]
    pub exclude_rules: Vec<Exclusion>,
}

/// A contiguous span of time between an inclusive start and an inclusive end.
///
/// # Examples
/// ```rust
/// # use dateperiods::periods::{DatePeriod, DefinitionLevel};
/// let period = DatePeriod::try_from_specs([2020, 10], [2021, 4]).unwrap();
/// assert_eq!(period.tcs().isoformat(), "2020-10-01T00:00:00");
/// assert_eq!(period.tce().isoformat(), "2021-04-30T23:59:59.999999");
/// assert_eq!(period.definition_level(), DefinitionLevel::Month);
/// assert_eq!(period.duration().isoformat(), "P7M");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DatePeriodConfig", into = "DatePeriodConfig")]
pub struct DatePeriod {
    tcs: DateDefinition,
    tce: DateDefinition,
    exclude_rules: Vec<Exclusion>,
    duration: DateDuration,
}

impl DatePeriod {
    /// Create a period from two resolved boundaries.
    pub fn try_new(tcs: DateDefinition, tce: DateDefinition) -> PeriodResult<Self> {
        let period = DatePeriod::build(tcs, tce, vec![])?;
        debug!("created period {} [{}]", period.label(), period.duration);
        Ok(period)
    }

    /// Create a period covering the calendar unit of a single definition.
    ///
    /// The end is the last instant of the year, month or day given by the definition level
    /// of `tcs`.
    pub fn try_from_single(tcs: DateDefinition) -> PeriodResult<Self> {
        let tce = DateDefinition::try_new(unit_spec(&tcs), Role::Tce)?;
        DatePeriod::try_new(tcs, tce)
    }

    /// Create a period from raw boundary inputs.
    pub fn try_from_specs(
        tcs: impl Into<DateSpec>,
        tce: impl Into<DateSpec>,
    ) -> PeriodResult<Self> {
        DatePeriod::try_new(
            DateDefinition::try_new(tcs, Role::Tcs)?,
            DateDefinition::try_new(tce, Role::Tce)?,
        )
    }

    /// Create a period from raw inputs, with an optional end and a list of exclusion rules.
    pub fn try_with_rules(
        tcs: impl Into<DateSpec>,
        tce: Option<DateSpec>,
        exclude_rules: Vec<Exclusion>,
    ) -> PeriodResult<Self> {
        let tcs = DateDefinition::try_new(tcs, Role::Tcs)?;
        let period = match tce {
            Some(tce) => DatePeriod::try_new(tcs, DateDefinition::try_new(tce, Role::Tce)?)?,
            None => DatePeriod::try_from_single(tcs)?,
        };
        Ok(period.with_exclude_rules(exclude_rules))
    }

    pub(crate) fn from_segment_bounds(
        tcs: NaiveDateTime,
        tce: NaiveDateTime,
    ) -> PeriodResult<Self> {
        DatePeriod::build(
            DateDefinition::from_instant(tcs, Role::Tcs),
            DateDefinition::from_instant(tce, Role::Tce),
            vec![],
        )
    }

    fn build(
        tcs: DateDefinition,
        tce: DateDefinition,
        exclude_rules: Vec<Exclusion>,
    ) -> PeriodResult<Self> {
        let duration = DateDuration::try_new(&tcs.instant(), &tce.instant())?;
        Ok(DatePeriod {
            tcs,
            tce,
            exclude_rules,
            duration,
        })
    }

    /// Return a copy of this period with the given exclusion rules.
    pub fn with_exclude_rules(&self, exclude_rules: Vec<Exclusion>) -> Self {
        DatePeriod {
            exclude_rules,
            ..self.clone()
        }
    }

    pub fn tcs(&self) -> &DateDefinition {
        &self.tcs
    }

    pub fn tce(&self) -> &DateDefinition {
        &self.tce
    }

    pub fn duration(&self) -> &DateDuration {
        &self.duration
    }

    pub fn exclude_rules(&self) -> &[Exclusion] {
        &self.exclude_rules
    }

    /// The finer of the definition levels of both boundaries.
    pub fn definition_level(&self) -> DefinitionLevel {
        self.tcs.definition_level().max(self.tce.definition_level())
    }

    /// Split the period into segments of one calendar unit, honouring the exclusion rules.
    pub fn get_segments(&self, segment_duration: SegmentDuration) -> PeriodIterator {
        PeriodIterator::new(
            self.tcs.instant(),
            self.tce.instant(),
            segment_duration,
            self.exclude_rules.clone(),
        )
    }

    /// As [`DatePeriod::get_segments`], parsing the segment duration from a string.
    pub fn try_get_segments(&self, segment_duration: &str) -> PeriodResult<PeriodIterator> {
        Ok(self.get_segments(segment_duration.parse()?))
    }

    /// As [`DatePeriod::get_segments`], with every segment cropped to this period.
    pub fn get_segments_cropped(&self, segment_duration: SegmentDuration) -> PeriodIterator {
        self.get_segments(segment_duration).crop_to_period(self)
    }

    /// `"{tcs} till {tce}"` with full datetime rendering.
    pub fn label(&self) -> String {
        format!("{} till {}", self.tcs, self.tce)
    }

    /// `"{tcs} till {tce}"` with dates only.
    pub fn date_label(&self) -> String {
        format!("{} till {}", self.tcs.date(), self.tce.date())
    }

    /// An identifier of the form `20180401T000000_20180430T235959`.
    pub fn get_id(&self) -> String {
        format!(
            "{}_{}",
            self.tcs.instant().format(ID_FORMAT),
            self.tce.instant().format(ID_FORMAT)
        )
    }

    /// An identifier using a custom strftime format for both boundaries.
    pub fn try_get_id(&self, dt_fmt: &str) -> PeriodResult<String> {
        let mut id = String::new();
        write!(
            id,
            "{}_{}",
            self.tcs.instant().format(dt_fmt),
            self.tce.instant().format(dt_fmt)
        )
        .map_err(|_| PeriodError::InvalidFormat(dt_fmt.to_string()))?;
        Ok(id)
    }

    /// Time coverage attributes following the ACDD conventions for netCDF files.
    pub fn netcdf_attributes(&self, zulu: bool) -> IndexMap<String, String> {
        let suffix = if zulu { "Z" } else { "" };
        let duration = self.duration.isoformat();
        IndexMap::from([
            (
                "time_coverage_start".to_string(),
                format!("{}{}", self.tcs.instant().format(ID_FORMAT), suffix),
            ),
            (
                "time_coverage_end".to_string(),
                format!("{}{}", self.tce.instant().format(ID_FORMAT), suffix),
            ),
            ("time_coverage_duration".to_string(), duration.clone()),
            ("time_coverage_resolution".to_string(), duration),
        ])
    }

    /// Whether both periods share at least one calendar day.
    pub fn has_overlap(&self, other: &DatePeriod) -> bool {
        self.tcs.date() <= other.tce.date() && other.tcs.date() <= self.tce.date()
    }

    /// The calendar days shared by both periods, or `None` if they are disjoint.
    pub fn intersect(&self, other: &DatePeriod) -> Option<DatePeriod> {
        if !self.has_overlap(other) {
            return None;
        }
        let tcs = self.tcs.date().max(other.tcs.date());
        let tce = self.tce.date().min(other.tce.date());
        // overlapping periods give ordered dates, so construction cannot fail
        match DatePeriod::try_from_specs(tcs, tce) {
            Ok(period) => Some(period),
            Err(e) => {
                debug_assert!(false, "unordered intersection bounds: {e}");
                None
            }
        }
    }

    /// The instant halfway between start and end, rounded to the nearest second.
    pub fn center(&self) -> NaiveDateTime {
        let half = (self.tce.instant() - self.tcs.instant()) / 2;
        let center = self.tcs.instant() + half;
        center
            .duration_round(TimeDelta::seconds(1))
            .unwrap_or(center)
    }

    /// The centre of the period in seconds since 1970-01-01 00:00:00.
    pub fn center_datenum(&self) -> f64 {
        self.center().and_utc().timestamp() as f64
    }
}

/// The input naming the whole calendar unit a definition was given in.
fn unit_spec(definition: &DateDefinition) -> DateSpec {
    let (year, month, day) = (
        definition.year(),
        definition.month() as i32,
        definition.day() as i32,
    );
    match definition.definition_level() {
        DefinitionLevel::Year => DateSpec::Ints(vec![year]),
        DefinitionLevel::Month => DateSpec::Ints(vec![year, month]),
        DefinitionLevel::Day => DateSpec::Ints(vec![year, month, day]),
    }
}

impl fmt::Display for DatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatePeriod: {} [{}]", self.label(), self.duration)
    }
}

impl TryFrom<DatePeriodConfig> for DatePeriod {
    type Error = PeriodError;
    fn try_from(config: DatePeriodConfig) -> PeriodResult<Self> {
        DatePeriod::try_with_rules(config.tcs, config.tce, config.exclude_rules)
    }
}

impl From<DatePeriod> for DatePeriodConfig {
    fn from(period: DatePeriod) -> Self {
        DatePeriodConfig {
            tcs: DateSpec::from(&period.tcs),
            tce: Some(DateSpec::from(&period.tce)),
            exclude_rules: period.exclude_rules,
        }
    }
}
