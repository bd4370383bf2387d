//! Fit geographic rings onto a square pixel canvas.
//!
//! Latitudes are stretched by [`LATITUDE_STRETCH`] before anything else, to offset
//! the flat equirectangular source geometry. The bounding box is taken over the
//! regions of a single call only, so a region drawn alone fills the canvas.

use crate::error::CoreError;
use crate::models::{RegionShape, Ring};
use serde::Serialize;

pub const LATITUDE_STRETCH: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedShape {
    pub key: String,
    /// Rings in pixel space, y growing downwards.
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Projected regions plus the canvas size actually used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<ProjectedShape>,
}

impl Projection {
    pub fn get(&self, key: &str) -> Option<&ProjectedShape> {
        self.shapes.iter().find(|s| s.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoProjector {
    /// Side of the square target canvas in pixels.
    pub size: f64,
    pub latitude_stretch: f64,
}

impl GeoProjector {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            latitude_stretch: LATITUDE_STRETCH,
        }
    }

    /// Project `shapes`, preserving their order.
    ///
    /// The wider of the two geographic extents maps onto the full canvas side and the
    /// other is scaled by the same factor, so the returned canvas is `size` on one
    /// axis and at most `size` on the other.
    pub fn project<'a>(
        &self,
        shapes: impl IntoIterator<Item = &'a RegionShape>,
    ) -> Result<Projection, CoreError> {
        let shapes: Vec<&RegionShape> = shapes.into_iter().collect();
        let stretch = self.latitude_stretch;

        let bounds = shapes
            .iter()
            .flat_map(|s| s.rings.iter())
            .flat_map(|r| r.iter())
            .map(|&(x, y)| (x, y * stretch))
            .fold(None, |acc: Option<Bounds>, (x, y)| {
                Some(match acc {
                    None => Bounds {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                    },
                    Some(b) => Bounds {
                        min_x: b.min_x.min(x),
                        min_y: b.min_y.min(y),
                        max_x: b.max_x.max(x),
                        max_y: b.max_y.max(y),
                    },
                })
            })
            .ok_or(CoreError::EmptyGeometrySet)?;

        let dx = bounds.max_x - bounds.min_x;
        let dy = bounds.max_y - bounds.min_y;
        if dx <= 0.0 && dy <= 0.0 {
            return Err(CoreError::DegenerateExtent);
        }
        let (width, height) = if dx > dy {
            (self.size, self.size * dy / dx)
        } else {
            (self.size * dx / dy, self.size)
        };
        let scale = self.size / dx.max(dy);

        let project_ring = |ring: &Ring| -> Vec<(f64, f64)> {
            ring.iter()
                .map(|&(x, y)| {
                    (
                        (x - bounds.min_x) * scale,
                        height - (y * stretch - bounds.min_y) * scale,
                    )
                })
                .collect()
        };

        Ok(Projection {
            width,
            height,
            shapes: shapes
                .iter()
                .map(|s| ProjectedShape {
                    key: s.key.clone(),
                    rings: s.rings.iter().map(project_ring).collect(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_axis_is_flipped() {
        let square = RegionShape::new("sq", vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]]);
        let p = GeoProjector::new(100.0).project([&square]).unwrap();
        // Tall after the latitude stretch: height is the full side.
        assert_eq!(p.height, 100.0);
        let ring = &p.shapes[0].rings[0];
        assert!((ring[0].1 - 100.0).abs() < 1e-9); // southernmost point at the bottom
        assert!(ring[2].1.abs() < 1e-9); // northernmost point at the top
    }
}
