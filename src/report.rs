//! One-shot report generation: legend, choropleth maps and exported statistics
//! written into an output directory.
//!
//! Output files:
//! - `heatmap.png`: gradient legend
//! - `us.{svg,png}`: nation map, states shaded by cases this week
//! - `state-{Name}.{svg,png}`: county map of every state with county data
//! - `county-{code}-zip.{svg,png}`: ZIP map of every county with ZIP boundaries
//! - `summary.json`: per-state summaries in ranking order
//! - `charts.json`: daily case/death chart series, nation first
//! - `us-series.csv`: the derived national series

use crate::choropleth::{MapEntry, MapLayer, Shading, save_map, shade_regions};
use crate::color::ColorScale;
use crate::config::ReportConfig;
use crate::error::CoreError;
use crate::geo::GeoProjector;
use crate::hierarchy::{RegionHierarchy, state_code_of};
use crate::ingest::{CountyTable, StateTable, ZipShapes, ZipTable};
use crate::legend::save_legend_png;
use crate::models::{Metric, Observation, RegionShape};
use crate::stats::{ChartSeries, DataSet, rank_regions};
use crate::storage::{RegionSummary, save_json, save_series_csv, save_summaries_json};
use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

// Allow -, _, . unescaped in page names
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Everything the report is built from, already parsed.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub national: DataSet,
    pub states: StateTable,
    pub counties: CountyTable,
    pub zips: ZipTable,
    /// Keyed by state name.
    pub state_shapes: Vec<RegionShape>,
    /// Keyed by county code.
    pub county_shapes: Vec<RegionShape>,
    /// ZIP boundaries grouped by county code or county name.
    pub zip_shapes: ZipShapes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub file: String,
    pub regions: usize,
    /// Top of the legend range (`0 … max_value`).
    pub max_value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub files: Vec<PathBuf>,
    pub maps: Vec<MapSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCharts {
    pub key: String,
    pub cases: ChartSeries,
    pub deaths: ChartSeries,
}

/// Page name fragment for a region name: spaces become underscores, the rest is
/// percent-encoded.
pub fn page_slug(name: &str) -> String {
    percent_encoding::utf8_percent_encode(&name.replace(' ', "_"), SAFE).to_string()
}

/// Fold a feed of latest county totals into a state and its counties.
///
/// The state receives one observation carrying the summed county totals, dated at
/// the newest county date; each listed county receives its own. Nothing changes
/// when the summed cases already match the state's total. Returns whether the
/// series were rebuilt.
pub fn apply_latest_totals(
    states: &mut StateTable,
    counties: &mut CountyTable,
    state: &str,
    latest: &BTreeMap<String, Observation>,
) -> bool {
    let Some(date) = latest.values().map(|o| o.date).max() else {
        return false;
    };
    let cases: u64 = latest.values().map(|o| o.cases).sum();
    let deaths: u64 = latest.values().map(|o| o.deaths).sum();
    let Some(current) = states.data.get_mut(state) else {
        log::warn!("latest totals given for unknown state {state}");
        return false;
    };
    if current.case_total() == cases {
        return false;
    }
    *current = current.with_correction(Observation::new(date, cases, deaths));
    for (code, obs) in latest {
        if let Some(series) = counties.data.get_mut(code) {
            *series = series.with_correction(*obs);
        }
    }
    log::info!("applied latest totals to {state}: {cases} cases, {deaths} deaths");
    true
}

/// Build the explicit state → county mapping from case data and county geometry.
///
/// Counties whose code is malformed or names no known state are left out.
pub fn build_hierarchy(inputs: &ReportInputs) -> Result<RegionHierarchy> {
    let state_codes: BTreeSet<&str> = inputs.states.fips.values().map(String::as_str).collect();
    let candidates: BTreeSet<&str> = inputs
        .counties
        .data
        .keys()
        .map(String::as_str)
        .chain(inputs.county_shapes.iter().map(|s| s.key.as_str()))
        .collect();
    let counties = candidates.into_iter().filter(|c| match state_code_of(c) {
        Ok(state) if state_codes.contains(state) => true,
        Ok(state) => {
            log::warn!("county {c} has no parent state {state}, left out");
            false
        }
        Err(e) => {
            log::warn!("{e}, left out");
            false
        }
    });
    let states = inputs
        .states
        .fips
        .iter()
        .map(|(name, code)| (code.as_str(), name.as_str()));
    let mut hierarchy =
        RegionHierarchy::build(states, counties).context("building region hierarchy")?;
    for (county, zips) in &inputs.zips {
        if let Err(e) = hierarchy.attach_zips(county, zips.clone()) {
            log::warn!("ZIP data for {county} skipped: {e}");
        }
    }
    Ok(hierarchy)
}

/// Write the whole report into `out_dir`, creating it if needed.
pub fn build_report<P: AsRef<Path>>(
    inputs: &ReportInputs,
    config: &ReportConfig,
    out_dir: P,
) -> Result<ReportOutcome> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let scale = ColorScale::default();
    let hierarchy = build_hierarchy(inputs)?;
    let mut outcome = ReportOutcome::default();

    let legend_path = out_dir.join("heatmap.png");
    save_legend_png(&legend_path, &scale, config.legend_width, config.legend_height)?;
    outcome.files.push(legend_path);

    // Nation: states shaded by cases this week.
    let drawn = geometry_keys(&inputs.state_shapes);
    let shading = shade_regions(
        config
            .nation_map_states
            .iter()
            .map(String::as_str)
            .filter(|name| drawn.contains(name)),
        |name| inputs.states.data.get(name).map(DataSet::cases_this_week),
        &scale,
    )?;
    let layer = hooked_layer(&shading, |name| {
        let slug = page_slug(name);
        (format!("{slug}.html"), format!("state_tooltip_{slug}"))
    });
    write_map(
        MapJob {
            stem: "us".to_string(),
            layer: &layer,
            shapes: &inputs.state_shapes,
            size: config.nation_map_size,
            max_value: shading.max_value,
        },
        config,
        out_dir,
        &mut outcome,
    )?;

    let ranking = rank_regions(inputs.states.data.iter());

    // States: counties shaded by cases this week.
    let drawn = geometry_keys(&inputs.county_shapes);
    for name in &ranking {
        let Some(code) = inputs.states.fips.get(name) else {
            continue;
        };
        let members: Vec<&str> = hierarchy.counties_of(code).collect();
        if !members.iter().any(|c| inputs.counties.data.contains_key(*c)) {
            continue;
        }
        let shading = shade_regions(
            members.into_iter().filter(|c| drawn.contains(c)),
            |c| inputs.counties.data.get(c).map(DataSet::cases_this_week),
            &scale,
        )?;
        let layer = hooked_layer(&shading, |c| {
            (format!("county-{c}.html"), format!("county_tooltip_{c}"))
        });
        write_map(
            MapJob {
                stem: format!("state-{}", page_slug(name)),
                layer: &layer,
                shapes: &inputs.county_shapes,
                size: config.state_map_size,
                max_value: shading.max_value,
            },
            config,
            out_dir,
            &mut outcome,
        )?;
    }

    // Counties with ZIP boundaries: every ZIP shape is drawn, those without data as 0.
    for county in inputs.counties.data.keys() {
        if hierarchy.state_of(county).is_none() {
            continue;
        }
        let Some(shapes) = zip_shapes_of(inputs, county) else {
            continue;
        };
        let zips = hierarchy.zips_of(county);
        let shading = shade_regions(
            shapes.iter().map(|s| s.key.as_str()),
            |z| {
                zips.and_then(|m| m.get(z))
                    .filter(|d| !d.is_empty())
                    .map(DataSet::cases_this_week)
            },
            &scale,
        )?;
        let layer = hooked_layer(&shading, |z| {
            (format!("#zip{z}"), format!("zip_tooltip_{z}"))
        });
        write_map(
            MapJob {
                stem: format!("county-{county}-zip"),
                layer: &layer,
                shapes,
                size: config.zip_map_size,
                max_value: shading.max_value,
            },
            config,
            out_dir,
            &mut outcome,
        )?;
    }

    let summaries: Vec<RegionSummary> = ranking
        .iter()
        .filter_map(|name| {
            let data = inputs.states.data.get(name)?;
            let key = inputs.states.fips.get(name).cloned().unwrap_or_default();
            Some(RegionSummary::new(key, name.as_str(), data))
        })
        .collect();
    let summary_path = out_dir.join("summary.json");
    save_summaries_json(&summaries, &summary_path)?;
    outcome.files.push(summary_path);

    let mut charts = vec![region_charts("us", &inputs.national, config)];
    charts.extend(
        ranking
            .iter()
            .filter_map(|name| Some(region_charts(name, inputs.states.data.get(name)?, config))),
    );
    let charts_path = out_dir.join("charts.json");
    save_json(&charts, &charts_path)?;
    outcome.files.push(charts_path);

    let series_path = out_dir.join("us-series.csv");
    save_series_csv(&inputs.national, &series_path)?;
    outcome.files.push(series_path);

    log::info!(
        "report complete: {} files in {}",
        outcome.files.len(),
        out_dir.display()
    );
    Ok(outcome)
}

fn geometry_keys(shapes: &[RegionShape]) -> BTreeSet<&str> {
    shapes.iter().map(|s| s.key.as_str()).collect()
}

/// ZIP boundaries of a county, grouped under its code or else its name.
fn zip_shapes_of<'a>(inputs: &'a ReportInputs, county: &str) -> Option<&'a [RegionShape]> {
    inputs
        .zip_shapes
        .get(county)
        .or_else(|| {
            let name = inputs.counties.names.get(county)?;
            inputs.zip_shapes.get(name)
        })
        .map(Vec::as_slice)
}

fn region_charts(key: &str, data: &DataSet, config: &ReportConfig) -> RegionCharts {
    RegionCharts {
        key: key.to_string(),
        cases: data.chart_series(Metric::Cases, config.chart_start),
        deaths: data.chart_series(Metric::Deaths, config.chart_start),
    }
}

/// Regions with data get a click-through link and a tooltip; the rest are plain.
fn hooked_layer<F>(shading: &Shading, hooks: F) -> MapLayer
where
    F: Fn(&str) -> (String, String),
{
    let mut layer = MapLayer::new();
    for region in &shading.regions {
        let entry = if region.has_data {
            let (link, tooltip) = hooks(&region.key);
            MapEntry {
                color: region.color,
                tooltip: Some(tooltip),
                link: Some(link),
            }
        } else {
            MapEntry::plain(region.color)
        };
        layer.insert(region.key.clone(), entry);
    }
    layer
}

struct MapJob<'a> {
    stem: String,
    layer: &'a MapLayer,
    shapes: &'a [RegionShape],
    size: f64,
    max_value: u64,
}

fn write_map(
    job: MapJob<'_>,
    config: &ReportConfig,
    out_dir: &Path,
    outcome: &mut ReportOutcome,
) -> Result<()> {
    let projection = match job.layer.project(job.shapes, &GeoProjector::new(job.size)) {
        Ok(p) => p,
        Err(CoreError::EmptyGeometrySet) => {
            log::warn!("no geometry for map {}, skipped", job.stem);
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("projecting map {}", job.stem)),
    };
    let file = format!("{}.{}", job.stem, config.map_format.extension());
    let path = out_dir.join(&file);
    save_map(&path, job.layer, &projection)?;
    log::info!(
        "wrote {} ({} regions, max {})",
        file,
        projection.shapes.len(),
        job.max_value
    );
    outcome.maps.push(MapSummary {
        file,
        regions: projection.shapes.len(),
        max_value: job.max_value,
    });
    outcome.files.push(path);
    Ok(())
}
