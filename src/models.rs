use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which of the two tracked counts a series refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    /// Noun used in descriptions, e.g. `("case", "cases")`.
    pub fn nouns(&self) -> (&'static str, &'static str) {
        match *self {
            Metric::Cases => ("case", "cases"),
            Metric::Deaths => ("death", "deaths"),
        }
    }

    pub fn label(&self) -> &'static str {
        match *self {
            Metric::Cases => "Cases",
            Metric::Deaths => "Deaths",
        }
    }
}

/// Raw input row: cumulative totals for one region on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
}

impl Observation {
    pub fn new(date: NaiveDate, cases: u64, deaths: u64) -> Self {
        Self {
            date,
            cases,
            deaths,
        }
    }
}

/// One day of a derived series (one row = one date for one region).
///
/// Increases are `None` only for the first point of a late-start series;
/// averages are `None` for the first seven points of a late-start series.
/// Present values are never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub case_total: u64,
    pub death_total: u64,
    pub case_increase: Option<u64>,
    pub death_increase: Option<u64>,
    pub case_increase_average: Option<f64>,
    pub death_increase_average: Option<f64>,
}

impl DataPoint {
    pub fn total(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Cases => self.case_total,
            Metric::Deaths => self.death_total,
        }
    }

    pub fn increase(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::Cases => self.case_increase,
            Metric::Deaths => self.death_increase,
        }
    }

    pub fn increase_average(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cases => self.case_increase_average,
            Metric::Deaths => self.death_increase_average,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation::new(self.date, self.case_total, self.death_total)
    }
}

/// A closed polygon ring as `(longitude, latitude)` pairs.
pub type Ring = Vec<(f64, f64)>;

/// Geometry of one region: a key (geographic code or name) plus its rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub key: String,
    pub rings: Vec<Ring>,
}

impl RegionShape {
    pub fn new(key: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self {
            key: key.into(),
            rings,
        }
    }
}
