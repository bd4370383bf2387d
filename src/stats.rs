use crate::error::CoreError;
use crate::models::{DataPoint, Metric, Observation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Positions looked back for the "this week" window.
pub const WEEK: usize = 7;
/// Positions looked back for the "last two weeks" window.
pub const TWO_WEEKS: usize = 14;

/// Aggregate counts for one metric of a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub total: u64,
    pub today: u64,
    pub this_week: u64,
    pub last_two_weeks: u64,
}

/// Fully derived statistics for one region.
///
/// Built once from raw observations by [`DataSet::from_observations`]; there are no
/// setters. To extend a series, build a new set with [`DataSet::with_correction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSet {
    points: Vec<DataPoint>,
    late_start: bool,
    cases: Tally,
    deaths: Tally,
}

impl Default for DataSet {
    fn default() -> Self {
        DataSet::from_observations(&[], false)
    }
}

impl DataSet {
    /// Derive daily increases, 7-value rolling averages and summary tallies.
    ///
    /// `observations` must be ordered by ascending date. With `late_start` the series
    /// is treated as a window of a longer one: the first increase and the first seven
    /// averages are left undefined instead of assuming a zero baseline.
    pub fn from_observations(observations: &[Observation], late_start: bool) -> Self {
        let case_totals: Vec<u64> = observations.iter().map(|o| o.cases).collect();
        let death_totals: Vec<u64> = observations.iter().map(|o| o.deaths).collect();

        let case_increase = raw_increases(&case_totals, late_start);
        let death_increase = raw_increases(&death_totals, late_start);
        let case_average = raw_averages(&case_totals, late_start);
        let death_average = raw_averages(&death_totals, late_start);

        let clamped = [&case_increase, &death_increase]
            .iter()
            .flat_map(|v| v.iter())
            .filter(|v| matches!(v, Some(x) if *x < 0))
            .count();
        if clamped > 0 {
            log::debug!("clamped {clamped} negative daily increases to zero");
        }

        let points: Vec<DataPoint> = observations
            .iter()
            .enumerate()
            .map(|(i, o)| DataPoint {
                date: o.date,
                case_total: o.cases,
                death_total: o.deaths,
                case_increase: clamp_count(case_increase[i]),
                death_increase: clamp_count(death_increase[i]),
                case_increase_average: clamp_average(case_average[i]),
                death_increase_average: clamp_average(death_average[i]),
            })
            .collect();

        let cases = tally(&points, Metric::Cases);
        let deaths = tally(&points, Metric::Deaths);
        DataSet {
            points,
            late_start,
            cases,
            deaths,
        }
    }

    /// Rebuild the set with one more observation.
    ///
    /// An observation for a date already present replaces that day; otherwise it is
    /// inserted at its chronological position. Aggregation is re-run over the whole
    /// extended sequence.
    pub fn with_correction(&self, correction: Observation) -> DataSet {
        let mut observations = self.observations();
        match observations.binary_search_by_key(&correction.date, |o| o.date) {
            Ok(i) => observations[i] = correction,
            Err(i) => observations.insert(i, correction),
        }
        DataSet::from_observations(&observations, self.late_start)
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn late_start(&self) -> bool {
        self.late_start
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.points.iter().map(DataPoint::observation).collect()
    }

    pub fn tally(&self, metric: Metric) -> Tally {
        match metric {
            Metric::Cases => self.cases,
            Metric::Deaths => self.deaths,
        }
    }

    pub fn case_total(&self) -> u64 {
        self.cases.total
    }
    pub fn death_total(&self) -> u64 {
        self.deaths.total
    }
    pub fn cases_today(&self) -> u64 {
        self.cases.today
    }
    pub fn deaths_today(&self) -> u64 {
        self.deaths.today
    }
    pub fn cases_this_week(&self) -> u64 {
        self.cases.this_week
    }
    pub fn deaths_this_week(&self) -> u64 {
        self.deaths.this_week
    }
    pub fn cases_last_two_weeks(&self) -> u64 {
        self.cases.last_two_weeks
    }
    pub fn deaths_last_two_weeks(&self) -> u64 {
        self.deaths.last_two_weeks
    }

    /// Strict positional lookback: last total minus the total `positions` points
    /// earlier, floored at zero.
    ///
    /// Unlike the summary tallies, this does not fall back to the first point.
    pub fn lookback_delta(&self, metric: Metric, positions: usize) -> Result<u64, CoreError> {
        let available = self.points.len();
        if available <= positions {
            return Err(CoreError::InsufficientHistory {
                requested: positions,
                available,
            });
        }
        let last = &self.points[available - 1];
        let base = &self.points[available - 1 - positions];
        Ok(last.total(metric).saturating_sub(base.total(metric)))
    }

    /// Daily values and averages for an external chart, starting at `since`.
    ///
    /// Days without a defined increase are skipped. Averages are rounded to one
    /// decimal; undefined averages stay `None`.
    pub fn chart_series(&self, metric: Metric, since: NaiveDate) -> ChartSeries {
        let mut out = ChartSeries {
            label: metric.label().to_string(),
            dates: Vec::new(),
            values: Vec::new(),
            averages: Vec::new(),
        };
        for p in self.points.iter().filter(|p| p.date >= since) {
            let Some(value) = p.increase(metric) else {
                continue;
            };
            out.dates.push(p.date);
            out.values.push(value);
            out.averages
                .push(p.increase_average(metric).map(|a| (a * 10.0).round() / 10.0));
        }
        out
    }
}

/// Parallel arrays consumed by a charting script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<u64>,
    pub averages: Vec<Option<f64>>,
}

/// Order region keys by `(cases_this_week, case_total)` descending; ties by key.
pub fn rank_regions<'a, K>(sets: impl IntoIterator<Item = (&'a K, &'a DataSet)>) -> Vec<K>
where
    K: Ord + Clone + 'a,
{
    let mut ranked: Vec<(&K, &DataSet)> = sets.into_iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| {
        (Reverse(a.cases_this_week()), Reverse(a.case_total()), *ka).cmp(&(
            Reverse(b.cases_this_week()),
            Reverse(b.case_total()),
            *kb,
        ))
    });
    ranked.into_iter().map(|(k, _)| k.clone()).collect()
}

// ------------------------ Derivation passes ------------------------

fn raw_increases(totals: &[u64], late_start: bool) -> Vec<Option<i64>> {
    totals
        .iter()
        .enumerate()
        .map(|(i, &t)| match i {
            0 if late_start => None,
            0 => Some(t as i64),
            _ => Some(t as i64 - totals[i - 1] as i64),
        })
        .collect()
}

fn raw_averages(totals: &[u64], late_start: bool) -> Vec<Option<f64>> {
    totals
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            if i >= WEEK {
                Some((t as f64 - totals[i - WEEK] as f64) / WEEK as f64)
            } else if late_start {
                None
            } else {
                Some(t as f64 / WEEK as f64)
            }
        })
        .collect()
}

fn clamp_count(v: Option<i64>) -> Option<u64> {
    v.map(|x| x.max(0) as u64)
}

fn clamp_average(v: Option<f64>) -> Option<f64> {
    v.map(|x| x.max(0.0))
}

fn tally(points: &[DataPoint], metric: Metric) -> Tally {
    let Some(last) = points.last() else {
        return Tally::default();
    };
    Tally {
        total: last.total(metric),
        today: last.increase(metric).unwrap_or(0),
        this_week: window_delta(points, metric, WEEK),
        last_two_weeks: window_delta(points, metric, TWO_WEEKS),
    }
}

/// Positional window ending at the last point; falls back to the first point when
/// the series is shorter than the window.
fn window_delta(points: &[DataPoint], metric: Metric, positions: usize) -> u64 {
    let last = points.len() - 1;
    let base = last.saturating_sub(positions);
    points[last]
        .total(metric)
        .saturating_sub(points[base].total(metric))
}
