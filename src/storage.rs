use crate::describe::count_description;
use crate::models::Metric;
use crate::stats::DataSet;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported row of region statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub key: String,
    pub name: String,
    pub case_total: u64,
    pub death_total: u64,
    pub cases_today: u64,
    pub deaths_today: u64,
    pub cases_this_week: u64,
    pub deaths_this_week: u64,
    pub cases_last_two_weeks: u64,
    pub deaths_last_two_weeks: u64,
    pub case_description: String,
    pub death_description: String,
}

impl RegionSummary {
    pub fn new(key: impl Into<String>, name: impl Into<String>, data: &DataSet) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            case_total: data.case_total(),
            death_total: data.death_total(),
            cases_today: data.cases_today(),
            deaths_today: data.deaths_today(),
            cases_this_week: data.cases_this_week(),
            deaths_this_week: data.deaths_this_week(),
            cases_last_two_weeks: data.cases_last_two_weeks(),
            deaths_last_two_weeks: data.deaths_last_two_weeks(),
            case_description: count_description(data, Metric::Cases),
            death_description: count_description(data, Metric::Deaths),
        }
    }
}

/// Save summaries as a pretty JSON array.
pub fn save_summaries_json<P: AsRef<Path>>(rows: &[RegionSummary], path: P) -> Result<()> {
    save_json(rows, path)
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save the derived daily series as CSV with header; undefined values are empty cells.
pub fn save_series_csv<P: AsRef<Path>>(data: &DataSet, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.serialize((
        "date",
        "case_total",
        "death_total",
        "case_increase",
        "death_increase",
        "case_increase_average",
        "death_increase_average",
    ))?;
    for p in data.points() {
        wtr.serialize((
            p.date,
            p.case_total,
            p.death_total,
            p.case_increase,
            p.death_increase,
            p.case_increase_average,
            p.death_increase_average,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}
