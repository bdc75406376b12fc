//! Error types shared by the orbit updater, the field sampler and the
//! scenario builder.
//!
//! - [`ConfigError`]        invalid static parameters, caught at construction
//! - [`DegenerateGeometry`] geometry with no defined direction, caught per tick
//! - [`StepError`]          everything `Orbiting::advance` can fail with

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("orbit rate must be positive and finite, got {0}")]
    NonPositiveRate(f64),

    #[error("near-field radius must be positive and finite, got {0}")]
    NonPositiveNearRadius(f64),

    #[error("finite-difference step must lie in (0, 1), got {0}")]
    InvalidProbeStep(f64),

    #[error("orbit fraction must lie in [0, 1), got {0}")]
    FractionOutOfRange(f64),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("analytic speed probe requested but the path has no derivative")]
    NoAnalyticDerivative,

    #[error("field declared without any sources")]
    NoSources,

    #[error("body `{body}` references unknown center `{center}`")]
    UnknownCenter { body: String, center: String },

    #[error("`{field}` must have 3 components, got {len}")]
    Dimension { field: &'static str, len: usize },

    #[error("invalid sampling grid: {0}")]
    InvalidGrid(String),

    #[error("invalid run parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DegenerateGeometry {
    #[error("body coincides with its center, orbit direction is undefined")]
    BodyAtCenter,

    #[error("path sampling degenerated at fraction {fraction}: zero local speed")]
    ZeroPathSpeed { fraction: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StepError {
    #[error(transparent)]
    Degenerate(#[from] DegenerateGeometry),

    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f64),

    #[error("body `{body}`: {source}")]
    Body {
        body: String,
        #[source]
        source: Box<StepError>,
    },
}
