use chrono::prelude::*;
use log::{debug, trace};

use crate::error::PeriodResult;
use crate::periods::definition::one_microsecond;
use crate::periods::exclude::{any_applies, ExcludeMonth, ExcludeRule, Exclusion};
use crate::periods::period::DatePeriod;
use crate::periods::segment::SegmentDuration;

/// A lazy, restartable sequence of sub-periods of a parent period.
///
/// Segments are emitted in order, one per calendar unit. The first segment begins at the
/// aligned start of the parent and the last one is clamped to the parent's end. Segments whose
/// start matches any exclusion rule are skipped, but still consume their full width.
///
/// # Examples
/// ```rust
/// # use dateperiods::periods::{DatePeriod, SegmentDuration};
/// let period = DatePeriod::try_from_specs([2018, 4, 15], [2018, 6, 10]).unwrap();
/// let labels: Vec<String> = period
///     .get_segments(SegmentDuration::Month)
///     .map(|p| p.date_label())
///     .collect();
/// assert_eq!(
///     labels,
///     vec![
///         "2018-04-15 till 2018-04-30",
///         "2018-05-01 till 2018-05-31",
///         "2018-06-01 till 2018-06-10",
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PeriodIterator {
    tcs: NaiveDateTime,
    tce: NaiveDateTime,
    segment_duration: SegmentDuration,
    exclude_rules: Vec<Exclusion>,
    crop: Option<(NaiveDateTime, NaiveDateTime)>,
    month_filter: Option<ExcludeMonth>,
    cursor: Option<NaiveDateTime>,
    n_periods: usize,
}

impl PeriodIterator {
    /// Create an iterator over the segments of `[tcs, tce]`.
    pub fn new(
        tcs: NaiveDateTime,
        tce: NaiveDateTime,
        segment_duration: SegmentDuration,
        exclude_rules: Vec<Exclusion>,
    ) -> Self {
        let mut iter = PeriodIterator {
            tcs,
            tce,
            segment_duration,
            exclude_rules,
            crop: None,
            month_filter: None,
            cursor: None,
            n_periods: 0,
        };
        iter.reset();
        iter.n_periods = iter.count_periods();
        debug!(
            "{} segmentation of {} till {}: {} periods",
            segment_duration, tcs, tce, iter.n_periods
        );
        iter
    }

    /// Restrict every emitted segment to the bounds of `period`.
    ///
    /// Segments without any overlap are dropped. The iterator is restarted.
    pub fn crop_to_period(mut self, period: &DatePeriod) -> Self {
        self.crop = Some((period.tcs().instant(), period.tce().instant()));
        self.reset();
        self.n_periods = self.count_periods();
        debug!(
            "cropped {} segmentation to {}: {} periods",
            self.segment_duration,
            period.label(),
            self.n_periods
        );
        self
    }

    /// Drop every emitted segment that starts or ends in one of the given months.
    ///
    /// Unlike an [`ExcludeMonth`] rule, the filter is applied to the final (clamped or cropped)
    /// segments and tests both of their boundaries. The iterator is restarted.
    pub fn try_filter_month(mut self, months: Vec<u32>) -> PeriodResult<Self> {
        let filter = ExcludeMonth::try_new(months)?;
        debug!("filtering {} segments by {}", self.segment_duration, filter);
        self.month_filter = Some(filter);
        self.reset();
        self.n_periods = self.count_periods();
        Ok(self)
    }

    /// Restart the iteration at the first segment.
    pub fn reset(&mut self) {
        self.cursor = Some(self.segment_duration.align(&self.tcs));
    }

    /// All segments of the full sequence, independent of the current position.
    pub fn list(&self) -> Vec<DatePeriod> {
        let mut iter = self.clone();
        iter.reset();
        iter.collect()
    }

    /// The number of segments in the full sequence.
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    pub fn segment_duration(&self) -> SegmentDuration {
        self.segment_duration
    }

    pub fn exclude_rules(&self) -> &[Exclusion] {
        &self.exclude_rules
    }

    fn count_periods(&self) -> usize {
        let mut iter = self.clone();
        iter.reset();
        iter.count()
    }
}

impl Iterator for PeriodIterator {
    type Item = DatePeriod;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cursor = self.cursor.filter(|c| *c <= self.tce)?;
            let candidate_end = self.segment_duration.unit_end(&cursor);
            self.cursor = candidate_end.checked_add_signed(one_microsecond());

            if any_applies(&self.exclude_rules, &cursor) {
                trace!("excluded {} segment starting {}", self.segment_duration, cursor);
                continue;
            }
            let (mut start, mut end) = (cursor, candidate_end.min(self.tce));
            if let Some((crop_tcs, crop_tce)) = self.crop {
                start = start.max(crop_tcs);
                end = end.min(crop_tce);
                if start > end {
                    continue;
                }
            }
            if let Some(filter) = &self.month_filter {
                if filter.applies(&start) || filter.applies(&end) {
                    trace!("filtered segment {} till {}", start, end);
                    continue;
                }
            }
            // start <= end holds for every segment, so construction cannot fail
            match DatePeriod::from_segment_bounds(start, end) {
                Ok(segment) => return Some(segment),
                Err(e) => {
                    debug_assert!(false, "unordered segment bounds: {e}");
                    return None;
                }
            }
        }
    }
}
