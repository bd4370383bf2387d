use chrono::{Days, NaiveDate};
use covmap::describe::count_description;
use covmap::models::{Metric, Observation};
use covmap::stats::DataSet;

fn build(cases: &[u64], deaths: &[u64]) -> DataSet {
    let start = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
    let obs: Vec<Observation> = cases
        .iter()
        .zip(deaths)
        .enumerate()
        .map(|(i, (&c, &d))| Observation::new(start + Days::new(i as u64), c, d))
        .collect();
    DataSet::from_observations(&obs, false)
}

#[test]
fn percentages_are_relative_to_the_pre_period() {
    let ds = build(&[100, 105], &[0, 0]);
    assert_eq!(
        count_description(&ds, Metric::Cases),
        "105 cases total, 5 cases today (+5.00%), 5 cases this week (+5.00%)"
    );
}

#[test]
fn zero_pre_period_reads_no_previous() {
    let ds = build(&[0, 5], &[0, 0]);
    assert_eq!(
        count_description(&ds, Metric::Cases),
        "5 cases total, 5 cases today (no previous), 5 cases this week (no previous)"
    );
}

#[test]
fn singular_wording_exactly_at_one() {
    let ds = build(&[0, 1, 2], &[0, 1, 1]);
    assert_eq!(
        count_description(&ds, Metric::Cases),
        "2 cases total, 1 case today (+100.00%), 2 cases this week (no previous)"
    );
    assert_eq!(
        count_description(&ds, Metric::Deaths),
        "1 death total, 0 deaths today (+0.00%), 1 death this week (no previous)"
    );
}

#[test]
fn single_point_case_series_reports_total_only() {
    let ds = build(&[1], &[0]);
    assert_eq!(count_description(&ds, Metric::Cases), "1 case total");
    // Deaths always carry the full sentence.
    assert_eq!(
        count_description(&ds, Metric::Deaths),
        "0 deaths total, 0 deaths today (no previous), 0 deaths this week (no previous)"
    );
}
