//! Report settings. Every field has a default; a JSON file may override any subset.

use crate::legend::{LEGEND_HEIGHT, LEGEND_WIDTH};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The 48 contiguous states plus DC, in the order they are painted on the nation map.
pub const CONTIGUOUS_STATES: [&str; 49] = [
    "Minnesota", "Indiana", "Alabama", "Maryland", "Washington", "New Hampshire",
    "Mississippi", "New York", "Arizona", "Delaware", "Wyoming", "Montana", "North Carolina",
    "Florida", "North Dakota", "West Virginia", "Oklahoma", "Illinois", "Vermont", "Iowa",
    "Wisconsin", "New Mexico", "California", "District of Columbia", "Missouri", "Virginia",
    "Louisiana", "Utah", "Michigan", "Connecticut", "Arkansas", "Nevada", "Idaho", "Ohio",
    "Texas", "South Dakota", "Kansas", "Rhode Island", "Massachusetts", "New Jersey",
    "Tennessee", "Pennsylvania", "Oregon", "Kentucky", "Colorado", "Georgia", "South Carolina",
    "Maine", "Nebraska",
];

/// Output format of rendered maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapFormat {
    /// Vector with tooltip/link hooks.
    Svg,
    /// Raster, no hooks.
    Png,
}

impl MapFormat {
    pub fn extension(&self) -> &'static str {
        match *self {
            MapFormat::Svg => "svg",
            MapFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub nation_map_size: f64,
    pub state_map_size: f64,
    pub zip_map_size: f64,
    pub legend_width: u32,
    pub legend_height: u32,
    /// First date exported to chart series.
    pub chart_start: NaiveDate,
    /// States drawn on the nation map, in paint order.
    pub nation_map_states: Vec<String>,
    pub map_format: MapFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            nation_map_size: 1000.0,
            state_map_size: 800.0,
            zip_map_size: 800.0,
            legend_width: LEGEND_WIDTH,
            legend_height: LEGEND_HEIGHT,
            chart_start: NaiveDate::from_ymd_opt(2020, 3, 15).expect("valid chart start"),
            nation_map_states: CONTIGUOUS_STATES.iter().map(|s| s.to_string()).collect(),
            map_format: MapFormat::Svg,
        }
    }
}

impl ReportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
