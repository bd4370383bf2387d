//! Readers for the tabular count feeds and GeoJSON boundary files.
//!
//! ### Formats
//! - national: `date,cases,deaths`
//! - states: `date,state,fips,cases,deaths`
//! - counties: `date,county,state,fips,cases,deaths` (deaths may be empty)
//! - ZIP codes: `date,fips,zip,cases` where `fips` is the owning county
//! - latest county totals: `date,fips,cases,deaths`
//!
//! Rows are grouped per region in first-seen order and sorted by date before
//! aggregation. Boundaries keep only the outer ring of every polygon.

use crate::hierarchy::NYC_CODE;
use crate::models::{Observation, RegionShape, Ring};
use crate::stats::DataSet;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NationalRow {
    date: NaiveDate,
    cases: u64,
    deaths: u64,
}

#[derive(Debug, Deserialize)]
struct StateRow {
    date: NaiveDate,
    state: String,
    fips: String,
    cases: u64,
    deaths: u64,
}

#[derive(Debug, Deserialize)]
struct CountyRow {
    date: NaiveDate,
    county: String,
    state: String,
    fips: Option<String>,
    cases: u64,
    deaths: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ZipRow {
    date: NaiveDate,
    fips: String,
    zip: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    cases: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TotalsRow {
    date: NaiveDate,
    fips: String,
    cases: u64,
    deaths: u64,
}

/// State-level series keyed by state name.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    /// Names in first-seen order.
    pub order: Vec<String>,
    pub fips: BTreeMap<String, String>,
    pub data: BTreeMap<String, DataSet>,
}

/// County-level series keyed by county code.
#[derive(Debug, Clone, Default)]
pub struct CountyTable {
    pub order: Vec<String>,
    pub names: BTreeMap<String, String>,
    /// County code → state name.
    pub states: BTreeMap<String, String>,
    pub data: BTreeMap<String, DataSet>,
}

/// County code → ZIP → late-start series.
pub type ZipTable = BTreeMap<String, BTreeMap<String, DataSet>>;

/// ZIP boundaries grouped by their owning county (code or name, as the file has it).
pub type ZipShapes = BTreeMap<String, Vec<RegionShape>>;

/// Which feature properties form the region key of a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKey {
    /// A single property, e.g. `NAME` or `ZIP`.
    Property(String),
    /// `STATE` followed by `COUNTY`, giving a five-digit county code.
    StateCounty,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize().enumerate() {
        let row: T = row.with_context(|| format!("{}: row {}", path.display(), i + 2))?;
        out.push(row);
    }
    Ok(out)
}

/// Observations grouped by key, keys in first-seen order.
struct Grouped {
    order: Vec<String>,
    rows: HashMap<String, Vec<Observation>>,
}

impl Grouped {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    fn push(&mut self, key: &str, obs: Observation) {
        if !self.rows.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.rows.entry(key.to_string()).or_default().push(obs);
    }

    fn into_datasets(mut self, late_start: bool) -> (Vec<String>, BTreeMap<String, DataSet>) {
        let mut data = BTreeMap::new();
        for key in &self.order {
            let mut obs = self.rows.remove(key).unwrap_or_default();
            obs.sort_by_key(|o| o.date);
            data.insert(key.clone(), DataSet::from_observations(&obs, late_start));
        }
        (self.order, data)
    }
}

pub fn read_national<P: AsRef<Path>>(path: P) -> Result<DataSet> {
    let mut obs: Vec<Observation> = read_rows::<NationalRow>(path.as_ref())?
        .into_iter()
        .map(|r| Observation::new(r.date, r.cases, r.deaths))
        .collect();
    obs.sort_by_key(|o| o.date);
    Ok(DataSet::from_observations(&obs, false))
}

pub fn read_states<P: AsRef<Path>>(path: P) -> Result<StateTable> {
    let mut grouped = Grouped::new();
    let mut fips = BTreeMap::new();
    for r in read_rows::<StateRow>(path.as_ref())? {
        fips.entry(r.state.clone()).or_insert(r.fips);
        grouped.push(&r.state, Observation::new(r.date, r.cases, r.deaths));
    }
    let (order, data) = grouped.into_datasets(false);
    log::info!("read {} state series from {}", order.len(), path.as_ref().display());
    Ok(StateTable { order, fips, data })
}

pub fn read_counties<P: AsRef<Path>>(path: P) -> Result<CountyTable> {
    let mut grouped = Grouped::new();
    let mut names = BTreeMap::new();
    let mut states = BTreeMap::new();
    let mut skipped = 0usize;
    for r in read_rows::<CountyRow>(path.as_ref())? {
        let code = if r.county == "New York City" {
            NYC_CODE.to_string()
        } else {
            match r.fips.filter(|f| !f.is_empty()) {
                Some(f) => f,
                None => {
                    skipped += 1;
                    continue;
                }
            }
        };
        names.entry(code.clone()).or_insert(r.county);
        states.entry(code.clone()).or_insert(r.state);
        grouped.push(
            &code,
            Observation::new(r.date, r.cases, r.deaths.unwrap_or(0)),
        );
    }
    if skipped > 0 {
        log::debug!("skipped {skipped} county rows without a code");
    }
    let (order, data) = grouped.into_datasets(false);
    log::info!("read {} county series from {}", order.len(), path.as_ref().display());
    Ok(CountyTable {
        order,
        names,
        states,
        data,
    })
}

/// ZIP series are snapshots that start mid-epidemic, so they are late-start series.
pub fn read_zip_cases<P: AsRef<Path>>(path: P) -> Result<ZipTable> {
    let mut per_county: BTreeMap<String, Grouped> = BTreeMap::new();
    for r in read_rows::<ZipRow>(path.as_ref())? {
        per_county
            .entry(r.fips)
            .or_insert_with(Grouped::new)
            .push(&r.zip, Observation::new(r.date, r.cases.unwrap_or(0), 0));
    }
    Ok(per_county
        .into_iter()
        .map(|(county, g)| (county, g.into_datasets(true).1))
        .collect())
}

/// Latest totals per county code, e.g. a same-day feed ahead of the main series.
pub fn read_latest_totals<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Observation>> {
    Ok(read_rows::<TotalsRow>(path.as_ref())?
        .into_iter()
        .map(|r| (r.fips, Observation::new(r.date, r.cases, r.deaths)))
        .collect())
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Read a GeoJSON FeatureCollection of `Polygon` / `MultiPolygon` features.
pub fn read_shapes<P: AsRef<Path>>(path: P, key: &ShapeKey) -> Result<Vec<RegionShape>> {
    let path = path.as_ref();
    let text = read_text(path)?;
    parse_shapes(&text, key).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_shapes(json: &str, key: &ShapeKey) -> Result<Vec<RegionShape>> {
    Ok(parse_features(json, key)?
        .into_iter()
        .map(|(_, shape)| shape)
        .collect())
}

/// Read ZIP boundaries and group them by the `group` property of each feature.
pub fn read_zip_shapes<P: AsRef<Path>>(path: P, key: &ShapeKey, group: &str) -> Result<ZipShapes> {
    let path = path.as_ref();
    let text = read_text(path)?;
    parse_zip_shapes(&text, key, group).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_zip_shapes(json: &str, key: &ShapeKey, group: &str) -> Result<ZipShapes> {
    let mut out = ZipShapes::new();
    for (props, shape) in parse_features(json, key)? {
        let Some(county) = props.get(group).map(value_to_string) else {
            bail!("feature {} lacks group property {group}", shape.key);
        };
        out.entry(county).or_default().push(shape);
    }
    Ok(out)
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_features(json: &str, key: &ShapeKey) -> Result<Vec<(Map<String, Value>, RegionShape)>> {
    let fc: FeatureCollection = serde_json::from_str(json)?;
    let mut out = Vec::with_capacity(fc.features.len());
    for (i, feature) in fc.features.into_iter().enumerate() {
        let props = feature.properties.unwrap_or_default();
        let Some(region) = feature_key(&props, key) else {
            bail!("feature {i} lacks key properties {key:?}");
        };
        let Some(geometry) = feature.geometry else {
            log::debug!("feature {region} has no geometry");
            continue;
        };
        let rings = outer_rings(geometry).with_context(|| format!("feature {region}"))?;
        out.push((props, RegionShape::new(region, rings)));
    }
    Ok(out)
}

fn feature_key(props: &Map<String, Value>, key: &ShapeKey) -> Option<String> {
    let prop = |name: &str| props.get(name).map(value_to_string);
    match key {
        ShapeKey::Property(name) => prop(name.as_str()),
        ShapeKey::StateCounty => Some(format!("{}{}", prop("STATE")?, prop("COUNTY")?)),
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn outer_rings(geometry: RawGeometry) -> Result<Vec<Ring>> {
    type Coords = Vec<Vec<f64>>;
    let polygons: Vec<Vec<Coords>> = match geometry.kind.as_str() {
        "Polygon" => vec![serde_json::from_value(geometry.coordinates)?],
        "MultiPolygon" => serde_json::from_value(geometry.coordinates)?,
        other => bail!("unsupported geometry type {other}"),
    };
    polygons
        .into_iter()
        .filter_map(|rings| rings.into_iter().next())
        .map(|ring| {
            ring.into_iter()
                .map(|pt| match pt.as_slice() {
                    [x, y, ..] => Ok((*x, *y)),
                    _ => bail!("coordinate with fewer than two values"),
                })
                .collect::<Result<Ring>>()
        })
        .collect()
}
