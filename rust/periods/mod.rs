//! Date periods, their calendar-aware durations and their segmentation.
//!
//! A [`DatePeriod`] is defined by a start (`tcs`, time coverage start) and an end (`tce`, time
//! coverage end), both inclusive. Loosely specified inputs are auto-completed to the first or
//! last microsecond of the unit they name.
//!
//! # Examples
//! ```rust
//! # use dateperiods::periods::{DatePeriod, ExcludeMonth, SegmentDuration};
//! let summer = ExcludeMonth::try_new(vec![5, 6, 7, 8, 9]).unwrap();
//! let winter = DatePeriod::try_with_rules([2018, 1], Some([2018, 12].into()), vec![summer.into()])
//!     .unwrap();
//! let months = winter.get_segments(SegmentDuration::Month);
//! assert_eq!(months.n_periods(), 7);
//! ```

mod definition;
mod duration;
mod exclude;
mod iterator;
mod period;
mod segment;

pub use crate::periods::definition::{
    end_of_day, get_eom, is_eom, ndt, start_of_day, DateDefinition, DateDefinitionConfig,
    DateSpec, DefinitionLevel, Role,
};
pub use crate::periods::duration::{DateDuration, DurationType};
pub use crate::periods::exclude::{ExcludeMonth, ExcludeRule, ExcludeWeekday, Exclusion};
pub use crate::periods::iterator::PeriodIterator;
pub use crate::periods::period::{DatePeriod, DatePeriodConfig};
pub use crate::periods::segment::SegmentDuration;
