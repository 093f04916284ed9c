//! This is the documentation for dateperiods
//!
//! Date periods defined by loosely specified start and end dates, with calendar-aware
//! durations, ISO 8601 formatting and segmentation into days, isoweeks, months or years.
//!
//! ```rust
//! # use dateperiods::periods::{DatePeriod, SegmentDuration};
//! let period = DatePeriod::try_from_specs("2020-10", "2021-04").unwrap();
//! assert_eq!(period.duration().isoformat(), "P7M");
//! assert_eq!(period.get_segments(SegmentDuration::Month).n_periods(), 7);
//! ```

#[cfg(test)]
mod tests;

pub mod error;
pub mod json;
pub mod periods;
