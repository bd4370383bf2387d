//! Choropleth maps: one filled, stroked shape per region ring.
//!
//! Maps are emitted as SVG text so every shape can carry the event hooks an
//! external tooltip script expects (`showTooltip` / `hideTooltip`), plus an optional
//! click-through link. A PNG rendition without hooks is available through plotters.

use crate::color::{ColorScale, Rgb};
use crate::error::CoreError;
use crate::geo::{GeoProjector, Projection};
use crate::models::RegionShape;
use anyhow::{Context, Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

pub const STROKE_COLOR: Rgb = Rgb::new(0x28, 0x28, 0x28);
pub const STROKE_WIDTH: u32 = 2;

/// How one region is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub color: Rgb,
    /// Identifier of the tooltip element the external script shows on hover.
    pub tooltip: Option<String>,
    /// Navigation target on click.
    pub link: Option<String>,
}

impl MapEntry {
    pub fn plain(color: Rgb) -> Self {
        Self {
            color,
            tooltip: None,
            link: None,
        }
    }
}

/// Region key → entry, iterated in insertion order (which is also the paint order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLayer {
    entries: Vec<(String, MapEntry)>,
    index: HashMap<String, usize>,
}

impl MapLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: MapEntry) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = entry,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MapEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project the geometry of every key in this layer that has any, in layer order.
    ///
    /// Keys without geometry are skipped; shapes without an entry are never drawn.
    pub fn project(
        &self,
        shapes: &[RegionShape],
        projector: &GeoProjector,
    ) -> Result<Projection, CoreError> {
        let by_key: HashMap<&str, &RegionShape> =
            shapes.iter().map(|s| (s.key.as_str(), s)).collect();
        let selected = self.iter().filter_map(|(key, _)| {
            let shape = by_key.get(key).copied();
            if shape.is_none() {
                log::debug!("no geometry for region {key}, not drawn");
            }
            shape
        });
        projector.project(selected)
    }
}

/// Scalar value and color of one region on a shaded map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadedRegion {
    pub key: String,
    pub value: u64,
    /// False when the region had geometry but no value (drawn as 0).
    pub has_data: bool,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shading {
    pub max_value: u64,
    pub regions: Vec<ShadedRegion>,
}

/// Total mapping from geometry keys to colors.
///
/// Every key gets a color; a key without a value counts as 0. The scale maximum is
/// the largest value among `keys`.
pub fn shade_regions<'a, F>(
    keys: impl IntoIterator<Item = &'a str>,
    value_of: F,
    scale: &ColorScale,
) -> Result<Shading, CoreError>
where
    F: Fn(&str) -> Option<u64>,
{
    let looked_up: Vec<(&str, Option<u64>)> =
        keys.into_iter().map(|k| (k, value_of(k))).collect();
    let max_value = looked_up
        .iter()
        .filter_map(|(_, v)| *v)
        .max()
        .unwrap_or(0);

    let mut regions = Vec::with_capacity(looked_up.len());
    for (key, value) in looked_up {
        if value.is_none() {
            log::debug!("region {key} has geometry but no data, shading as 0");
        }
        let v = value.unwrap_or(0);
        regions.push(ShadedRegion {
            key: key.to_string(),
            value: v,
            has_data: value.is_some(),
            color: scale.color_for(v as f64, max_value as f64)?,
        });
    }
    Ok(Shading { max_value, regions })
}

/// Emit the layer as an SVG document sized to the projection.
pub fn render_svg(layer: &MapLayer, projection: &Projection) -> String {
    let mut out = format!(
        "<svg version=\"1.1\" baseProfile=\"full\" width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        projection.width, projection.height
    );
    for shape in &projection.shapes {
        let Some(entry) = layer.get(&shape.key) else {
            continue;
        };
        for ring in &shape.rings {
            out.push_str("<polygon points=\"");
            for (x, y) in ring {
                out.push_str(&format!("{x},{y} "));
            }
            out.push_str(&format!(
                "\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" ",
                entry.color, STROKE_COLOR, STROKE_WIDTH
            ));
            if let Some(tooltip) = &entry.tooltip {
                let id = escape_hook_arg(tooltip);
                out.push_str(&format!("onmousemove=\"showTooltip(evt, '{id}');\" "));
                out.push_str(&format!("onmouseout=\"hideTooltip('{id}');\" "));
            }
            if let Some(link) = &entry.link {
                out.push_str(&format!(
                    "onclick=\"document.location.href = '{}';\" ",
                    escape_hook_arg(link)
                ));
            }
            out.push_str("/>\n");
        }
    }
    out.push_str("</svg>\n");
    out
}

/// Project `shapes` for `layer` onto a `size` canvas and render SVG.
pub fn render_map_svg(
    layer: &MapLayer,
    shapes: &[RegionShape],
    size: f64,
) -> Result<String, CoreError> {
    let projection = layer.project(shapes, &GeoProjector::new(size))?;
    Ok(render_svg(layer, &projection))
}

/// Raster rendition: filled polygons with the fixed stroke, on white.
pub fn draw_map<DB>(
    root: &DrawingArea<DB, Shift>,
    layer: &MapLayer,
    projection: &Projection,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let stroke = RGBColor::from(STROKE_COLOR).stroke_width(STROKE_WIDTH);
    for shape in &projection.shapes {
        let Some(entry) = layer.get(&shape.key) else {
            continue;
        };
        let fill = RGBColor::from(entry.color).filled();
        for ring in &shape.rings {
            let mut pts: Vec<(i32, i32)> = ring
                .iter()
                .map(|&(x, y)| (x.round() as i32, y.round() as i32))
                .collect();
            let Some(&first) = pts.first() else {
                continue;
            };
            root.draw(&Polygon::new(pts.clone(), fill))
                .map_err(|e| anyhow!("{:?}", e))?;
            pts.push(first);
            root.draw(&PathElement::new(pts, stroke))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Write a map: `.svg` → SVG text with hooks; anything else → PNG raster.
pub fn save_map<P: AsRef<Path>>(
    out_path: P,
    layer: &MapLayer,
    projection: &Projection,
) -> Result<()> {
    let out_path = out_path.as_ref();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        std::fs::write(out_path, render_svg(layer, projection))
            .with_context(|| format!("writing {}", out_path.display()))?;
    } else {
        let path_string = out_path.to_string_lossy().into_owned();
        let size = (
            (projection.width.ceil() as u32).max(1),
            (projection.height.ceil() as u32).max(1),
        );
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_map(&root, layer, projection)?;
    }
    Ok(())
}

/// Hook arguments sit in a single-quoted JS string inside a double-quoted attribute.
fn escape_hook_arg(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
