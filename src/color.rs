//! Heat-map color scale: gray → cool blue → warm tan → red.
//!
//! A value is mapped to `value / max_value` and blended linearly between the two
//! stops enclosing that fraction. Zero always maps to the neutral gray.

use crate::error::CoreError;
use plotters::style::RGBColor;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel blend `a*(1-t) + b*t`, truncated to an integer.
    pub fn interpolate(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t) as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    /// `#rrggbb`, lowercase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Serialized as the `#rrggbb` string.
impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.r, c.g, c.b)
    }
}

pub const NEUTRAL_GRAY: Rgb = Rgb::new(72, 72, 72);
pub const COOL_BLUE: Rgb = Rgb::new(128, 198, 233);
pub const WARM_TAN: Rgb = Rgb::new(237, 223, 179);
pub const RED: Rgb = Rgb::new(222, 143, 151);

/// Stop positions (fraction of the maximum) and their colors.
const HEAT_STOPS: [(f64, Rgb); 4] = [
    (0.0, NEUTRAL_GRAY),
    (0.1, COOL_BLUE),
    (0.5, WARM_TAN),
    (1.0, RED),
];

/// Piecewise-linear gradient over fixed stops.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    zero: Rgb,
    stops: Vec<(f64, Rgb)>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            zero: NEUTRAL_GRAY,
            stops: HEAT_STOPS.to_vec(),
        }
    }
}

impl ColorScale {
    /// Color for `value` on a scale whose top is `max_value`.
    ///
    /// - `value <= 0` (or NaN) → the neutral color, whatever `max_value` is.
    /// - `max_value <= 0` with a positive value → [`CoreError::DivisionByZeroScale`].
    /// - `value > max_value` saturates at the top stop.
    pub fn color_for(&self, value: f64, max_value: f64) -> Result<Rgb, CoreError> {
        if !(value > 0.0) {
            return Ok(self.zero);
        }
        if !(max_value > 0.0) {
            return Err(CoreError::DivisionByZeroScale { value });
        }
        let frac = (value / max_value).min(1.0);
        let mut lower = self.stops[0];
        for &upper in &self.stops[1..] {
            if frac <= upper.0 {
                let t = (frac - lower.0) / (upper.0 - lower.0);
                return Ok(lower.1.interpolate(upper.1, t));
            }
            lower = upper;
        }
        Ok(lower.1)
    }

    pub fn zero_color(&self) -> Rgb {
        self.zero
    }
}

/// [`ColorScale::color_for`] on the default heat scale.
pub fn color_for(value: f64, max_value: f64) -> Result<Rgb, CoreError> {
    ColorScale::default().color_for(value, max_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_two_digits_per_channel() {
        assert_eq!(Rgb::new(237, 10, 0).to_string(), "#ed0a00");
    }

    #[test]
    fn serializes_as_hex_string() {
        assert_eq!(serde_json::to_string(&RED).unwrap(), "\"#de8f97\"");
    }

    #[test]
    fn interpolation_truncates() {
        // 72*0.5 + 128*0.5 = 100; 72*0.5 + 198*0.5 = 135; 72*0.5 + 233*0.5 = 152.5 -> 152
        assert_eq!(NEUTRAL_GRAY.interpolate(COOL_BLUE, 0.5), Rgb::new(100, 135, 152));
    }

    #[test]
    fn overflowing_value_saturates_at_red() {
        assert_eq!(color_for(250.0, 100.0).unwrap(), RED);
    }
}
