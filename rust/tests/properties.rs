use crate::periods::{
    end_of_day, DateDefinition, DatePeriod, ExcludeMonth, Exclusion, Role, SegmentDuration,
};
use chrono::{Days, NaiveDate, TimeDelta};
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1950i32..2100, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        (1..=d)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(y, m, day))
            .unwrap_or_default()
    })
}

fn period_strategy() -> impl Strategy<Value = DatePeriod> {
    (date_strategy(), 0u64..1500).prop_map(|(tcs, days)| {
        let tce = tcs + Days::new(days);
        DatePeriod::try_from_specs(tcs, tce).unwrap()
    })
}

fn unit_strategy() -> impl Strategy<Value = SegmentDuration> {
    prop_oneof![
        Just(SegmentDuration::Day),
        Just(SegmentDuration::IsoWeek),
        Just(SegmentDuration::Month),
        Just(SegmentDuration::Year),
    ]
}

proptest! {
    #[test]
    fn duration_round_trip(p in period_strategy()) {
        let end = p.duration().apply(&p.tcs().instant()).unwrap();
        prop_assert_eq!(end, p.tce().instant() + TimeDelta::microseconds(1));
    }

    #[test]
    fn duration_round_trip_with_time(p in period_strategy(), hours in 0i64..24, minutes in 0i64..60) {
        let tcs = p.tcs().instant() + TimeDelta::hours(hours) + TimeDelta::minutes(minutes);
        prop_assume!(tcs <= p.tce().instant());
        let q = DatePeriod::try_from_specs(tcs, p.tce().instant()).unwrap();
        prop_assert_eq!(
            q.duration().apply(&tcs).unwrap(),
            q.tce().instant() + TimeDelta::microseconds(1)
        );
    }

    #[test]
    fn rederived_period_is_identical(p in period_strategy()) {
        let q = DatePeriod::try_new(
            DateDefinition::from_instant(p.tcs().instant(), Role::Tcs),
            DateDefinition::from_instant(p.tce().instant(), Role::Tce),
        )
        .unwrap();
        prop_assert_eq!(q.duration(), p.duration());
    }

    #[test]
    fn segments_cover_period(p in period_strategy(), unit in unit_strategy()) {
        let segments = p.get_segments(unit).list();
        prop_assert!(!segments.is_empty());
        prop_assert_eq!(segments[0].tcs().instant(), unit.align(&p.tcs().instant()));
        prop_assert_eq!(segments.last().unwrap().tce().instant(), p.tce().instant());
        for pair in segments.windows(2) {
            prop_assert_eq!(
                pair[0].tce().instant() + TimeDelta::microseconds(1),
                pair[1].tcs().instant()
            );
        }
    }

    #[test]
    fn excluded_segments_are_skipped(p in period_strategy(), month in 1u32..=12) {
        let rule: Exclusion = ExcludeMonth::try_new(vec![month]).unwrap().into();
        let all = p.get_segments(SegmentDuration::Day).list();
        let kept = p
            .with_exclude_rules(vec![rule])
            .get_segments(SegmentDuration::Day)
            .list();
        let expected: Vec<DatePeriod> = all
            .into_iter()
            .filter(|s| s.tcs().month() != month)
            .collect();
        prop_assert_eq!(kept.len(), expected.len());
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn cropped_segments_stay_inside(p in period_strategy(), unit in unit_strategy()) {
        let segments = p.get_segments_cropped(unit);
        let n = segments.n_periods();
        let list = segments.list();
        prop_assert_eq!(list.len(), n);
        for s in list {
            prop_assert!(s.tcs().instant() >= p.tcs().instant());
            prop_assert!(s.tce().instant() <= end_of_day(&p.tce().date()));
        }
    }
}
