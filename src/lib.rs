//! covmap
//!
//! Derive daily epidemiological statistics from cumulative case/death counts and
//! render them as choropleth maps with a matching gradient legend. Pairs with the
//! `covmap` CLI.
//!
//! ### Features
//! - Daily increases, 7-value rolling averages, today/week/two-week tallies
//! - Three-segment heat color scale (gray → blue → tan → red)
//! - Aspect-preserving projection of region outlines onto a square canvas
//! - SVG choropleth maps with tooltip/link hooks, or PNG renditions
//! - Gradient legend bitmap
//!
//! ### Example
//! ```no_run
//! use covmap::{DataSet, Observation};
//! use covmap::choropleth::{MapEntry, MapLayer, render_map_svg};
//! use covmap::models::RegionShape;
//! use chrono::NaiveDate;
//!
//! let d = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
//! let data = DataSet::from_observations(&[Observation::new(d, 12, 1)], false);
//! let color = covmap::color::color_for(data.cases_this_week() as f64, 20.0)?;
//!
//! let mut layer = MapLayer::new();
//! layer.insert("A", MapEntry::plain(color));
//! let shapes = vec![RegionShape::new("A", vec![vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0)]])];
//! let svg = render_map_svg(&layer, &shapes, 800.0)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod choropleth;
pub mod color;
pub mod config;
pub mod describe;
pub mod error;
pub mod geo;
pub mod hierarchy;
pub mod ingest;
pub mod legend;
pub mod models;
pub mod report;
pub mod stats;
pub mod storage;

pub use color::{ColorScale, Rgb};
pub use error::CoreError;
pub use models::{DataPoint, Metric, Observation};
pub use stats::DataSet;
