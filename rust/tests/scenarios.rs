use crate::periods::{
    end_of_day, ndt, DatePeriod, DateSpec, DefinitionLevel, DurationType, ExcludeMonth,
    ExcludeWeekday, Exclusion, SegmentDuration,
};
use crate::tests::init_logger;
use chrono::{NaiveDateTime, TimeDelta};

fn eod(year: i32, month: u32, day: u32) -> NaiveDateTime {
    end_of_day(&ndt(year, month, day).date())
}

#[test]
fn winter_season_with_autocompletion() {
    init_logger();
    let p = DatePeriod::try_from_specs([2020, 10], [2021, 4]).unwrap();
    assert_eq!(p.tcs().isoformat(), "2020-10-01T00:00:00");
    assert_eq!(p.tce().isoformat(), "2021-04-30T23:59:59.999999");
    assert_eq!(p.definition_level(), DefinitionLevel::Month);
    assert_eq!(p.duration().isoformat(), "P7M");
    assert_eq!(p.duration().duration_type(), DurationType::Custom);
}

#[test]
fn single_year_definition() {
    init_logger();
    let p = DatePeriod::try_with_rules([2020], None, vec![]).unwrap();
    assert_eq!(p.tcs().isoformat(), "2020-01-01T00:00:00");
    assert_eq!(p.tce().isoformat(), "2020-12-31T23:59:59.999999");
    assert_eq!(p.duration().isoformat(), "P1Y");
    assert!(p.duration().is_year());
}

#[test]
fn day_definitions_carry_into_months() {
    let p = DatePeriod::try_from_specs("2020-10-01", "2021-04-30").unwrap();
    assert_eq!(p.duration().isoformat(), "P7M");
    let p = DatePeriod::try_from_specs("2018-10-01", "2019-04-30").unwrap();
    assert_eq!(p.duration().isoformat(), "P7M");
}

#[test]
fn exclude_summer_months() {
    init_logger();
    let rules: Vec<Exclusion> = vec![ExcludeMonth::try_new(vec![5, 9]).unwrap().into()];
    let p = DatePeriod::try_with_rules([2020, 9, 1], Some([2021, 5, 31].into()), rules).unwrap();
    let segments = p.get_segments(SegmentDuration::Month);
    assert_eq!(segments.n_periods(), 7);
    let starts: Vec<NaiveDateTime> = segments.list().iter().map(|s| s.tcs().instant()).collect();
    assert_eq!(starts.first(), Some(&ndt(2020, 10, 1)));
    assert_eq!(starts.last(), Some(&ndt(2021, 4, 1)));
    assert!(segments.list().iter().all(|s| s.duration().is_month()));
}

#[test]
fn invalid_period_order() {
    let result = DatePeriod::try_from_specs("2018-05-01", "2018-04-30");
    assert!(matches!(
        result,
        Err(crate::error::PeriodError::InvalidPeriod { .. })
    ));
}

#[test]
fn segments_tile_the_aligned_period() {
    init_logger();
    let options: Vec<(DateSpec, DateSpec, SegmentDuration)> = vec![
        ([2018, 4, 1].into(), [2018, 4, 30].into(), SegmentDuration::IsoWeek),
        ([2018, 4, 15].into(), [2019, 2, 3].into(), SegmentDuration::Month),
        ([2018, 4, 15].into(), [2021, 2, 3].into(), SegmentDuration::Year),
        ([2018, 2, 20].into(), [2018, 3, 10].into(), SegmentDuration::Day),
    ];
    for (tcs, tce, unit) in options {
        let p = DatePeriod::try_from_specs(tcs, tce).unwrap();
        let segments = p.get_segments(unit).list();
        assert_eq!(segments[0].tcs().instant(), unit.align(&p.tcs().instant()));
        for pair in segments.windows(2) {
            assert_eq!(
                pair[0].tce().instant() + TimeDelta::microseconds(1),
                pair[1].tcs().instant()
            );
        }
        assert_eq!(segments.last().unwrap().tce().instant(), p.tce().instant());
    }
}

#[test]
fn excluded_segments_keep_their_width() {
    // Mondays excluded from isoweek segments removes every full week
    let rules: Vec<Exclusion> = vec![ExcludeWeekday::try_new(vec![1]).unwrap().into()];
    let p = DatePeriod::try_with_rules([2018, 4], None, rules).unwrap();
    assert_eq!(p.get_segments(SegmentDuration::IsoWeek).n_periods(), 0);
    assert_eq!(p.get_segments(SegmentDuration::Day).n_periods(), 25);

    let rules: Vec<Exclusion> = vec![ExcludeMonth::try_new(vec![4]).unwrap().into()];
    let p = p.with_exclude_rules(rules);
    let days = p.get_segments(SegmentDuration::Day);
    assert_eq!(days.n_periods(), 0);
    let cropped = DatePeriod::try_from_specs([2018, 3, 28], [2018, 5, 2])
        .unwrap()
        .with_exclude_rules(p.exclude_rules().to_vec());
    let kept: Vec<String> = cropped
        .get_segments(SegmentDuration::Day)
        .map(|s| s.date_label())
        .collect();
    assert_eq!(
        kept,
        vec![
            "2018-03-28 till 2018-03-28",
            "2018-03-29 till 2018-03-29",
            "2018-03-30 till 2018-03-30",
            "2018-03-31 till 2018-03-31",
            "2018-05-01 till 2018-05-01",
            "2018-05-02 till 2018-05-02",
        ]
    );
}

#[test]
fn explicit_times_and_last_segment_clamp() {
    let tcs = ndt(2018, 4, 1) + TimeDelta::hours(6);
    let tce = ndt(2018, 4, 3) + TimeDelta::hours(18);
    let p = DatePeriod::try_from_specs(tcs, tce).unwrap();
    assert_eq!(p.tce().instant(), tce);
    let segments = p.get_segments(SegmentDuration::Day).list();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].tcs().instant(), tcs);
    assert_eq!(segments[0].tce().instant(), eod(2018, 4, 1));
    assert_eq!(segments[2].tce().instant(), tce);
    assert_eq!(segments[2].duration().isoformat(), "PT18H0.000001S");
    assert!(segments.iter().all(|s| s.duration().is_day()));
}
