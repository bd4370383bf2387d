//! Typed failures of the analytical and rendering core.
//!
//! Count anomalies (revisions producing negative deltas) are not errors; they are
//! clamped during aggregation. These variants cover inputs the core cannot turn into
//! meaningful output.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A nonzero value was scaled against a maximum of zero.
    #[error("cannot scale value {value} against a maximum of 0")]
    DivisionByZeroScale { value: f64 },

    /// Projection was asked to fit a region set without a single polygon point.
    #[error("no polygon points in the supplied region set")]
    EmptyGeometrySet,

    /// Every point of the region set lies on the same coordinate.
    #[error("region set has zero geographic extent")]
    DegenerateExtent,

    /// A strict lookback reached further back than the series goes.
    #[error("lookback of {requested} positions needs {needed} points, series has {available}", needed = .requested + 1)]
    InsufficientHistory { requested: usize, available: usize },

    #[error("invalid region code {code:?}")]
    InvalidRegionCode { code: String },

    /// County code whose state prefix is not a known state.
    #[error("county {county} has no parent state {state}")]
    OrphanCounty { county: String, state: String },
}
