//! Gradient legend bitmap for heat maps.
//!
//! Column `x` of a `width`-pixel legend shows the color of value `x` on a scale whose
//! maximum is `width - 1`, so the strip runs from the zero color to the top stop.
//! Every row is identical.

use crate::color::ColorScale;
use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use std::path::Path;

pub const LEGEND_WIDTH: u32 = 400;
pub const LEGEND_HEIGHT: u32 = 8;

/// Paint the gradient across the whole drawing area.
pub fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, scale: &ColorScale) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = area.dim_in_pixel();
    let max_value = w.saturating_sub(1) as f64;
    for x in 0..w {
        let color: RGBColor = scale.color_for(x as f64, max_value)?.into();
        for y in 0..h {
            area.draw_pixel((x as i32, y as i32), &color)
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    area.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Render the legend into a packed RGB buffer (`width * height * 3` bytes, row-major).
pub fn legend_rgb(scale: &ColorScale, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_legend(&root, scale)?;
    }
    Ok(buf)
}

/// Write the legend as a PNG (format follows the file extension).
pub fn save_legend_png<P: AsRef<Path>>(
    out_path: P,
    scale: &ColorScale,
    width: u32,
    height: u32,
) -> Result<()> {
    let path_string = out_path.as_ref().to_string_lossy().into_owned();
    let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
    draw_legend(&root, scale)
}
