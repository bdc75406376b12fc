//! Inverse-square vector fields with a near-field clamp
//!
//! [`FieldSampler`] superposes one contribution per [`Source`]:
//!
//! ```text
//! d = source - query
//! |d| == 0            -> skipped
//! |d| <  near_radius  -> -strength * d / near_radius^3
//! otherwise           -> -strength * d / |d|^3
//! ```
//!
//! With this sign convention a negative strength pulls toward its source
//! (masses are given negative strengths) and a positive strength pushes away.
//! [`FieldSet`] sums several independently configured fields, and
//! [`sample_grid`] lays a field out on a regular grid for arrow-glyph renderers.

use crate::error::ConfigError;
use crate::simulation::states::NVec3;

/// Anything that maps a point in space to a vector
pub trait VectorField {
    fn evaluate(&self, query: &NVec3) -> NVec3;
}

/// A point source. Negative strength is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub position: NVec3,
    pub strength: f64,
}

impl Source {
    pub fn new(position: NVec3, strength: f64) -> Self {
        Self { position, strength }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    pub near_radius: f64, // below this distance falloff is clamped
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { near_radius: 0.5 }
    }
}

/// Superposed inverse-square field over a fixed list of sources
#[derive(Debug, Clone)]
pub struct FieldSampler {
    sources: Vec<Source>,
    near_radius: f64,
    near_radius3: f64, // near_radius^3, used inside the clamp
}

impl FieldSampler {
    /// Build a sampler. An empty source list is accepted and yields a zero field.
    pub fn new(sources: Vec<Source>, config: SamplerConfig) -> Result<Self, ConfigError> {
        let r = config.near_radius;
        if !(r.is_finite() && r > 0.0) {
            return Err(ConfigError::NonPositiveNearRadius(r));
        }
        Ok(Self {
            sources,
            near_radius: r,
            near_radius3: r * r * r,
        })
    }

    /// Like [`FieldSampler::new`], but rejects an empty source list.
    pub fn require_sources(sources: Vec<Source>, config: SamplerConfig) -> Result<Self, ConfigError> {
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        Self::new(sources, config)
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn near_radius(&self) -> f64 {
        self.near_radius
    }

    /// Field vector at `query`
    pub fn evaluate(&self, query: &NVec3) -> NVec3 {
        let mut result = NVec3::zeros();
        for source in &self.sources {
            let to_center = source.position - query;
            let norm = to_center.norm();

            // Exactly on the source: no defined direction, contributes nothing
            if norm == 0.0 {
                continue;
            }

            let scaled = if norm < self.near_radius {
                to_center / self.near_radius3
            } else {
                to_center / (norm * norm * norm)
            };

            result += -source.strength * scaled;
        }
        result
    }
}

impl VectorField for FieldSampler {
    fn evaluate(&self, query: &NVec3) -> NVec3 {
        FieldSampler::evaluate(self, query)
    }
}

/// Collection of vector fields whose values are summed
pub struct FieldSet {
    terms: Vec<Box<dyn VectorField + Send + Sync>>,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a field term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: VectorField + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl VectorField for FieldSet {
    fn evaluate(&self, query: &NVec3) -> NVec3 {
        self.terms
            .iter()
            .fold(NVec3::zeros(), |acc, term| acc + term.evaluate(query))
    }
}

/// Regular grid in a plane of constant `z`
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub delta_x: f64,
    pub delta_y: f64,
    pub z: f64,
}

impl GridSpec {
    /// Largest number of points a grid may expand to
    pub const MAX_POINTS: usize = 4_000_000;

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, delta) in [("delta_x", self.delta_x), ("delta_y", self.delta_y)] {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::InvalidGrid(format!("{name} must be positive, got {delta}")));
            }
        }
        for (name, [lo, hi]) in [("x_range", self.x_range), ("y_range", self.y_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(ConfigError::InvalidGrid(format!("{name} must be [min, max], got [{lo}, {hi}]")));
            }
        }

        let nx = Self::axis_len(self.x_range[0], self.x_range[1], self.delta_x);
        let ny = Self::axis_len(self.y_range[0], self.y_range[1], self.delta_y);
        if !(nx * ny <= Self::MAX_POINTS as f64) {
            return Err(ConfigError::InvalidGrid(format!(
                "grid expands to {nx} x {ny} points, limit is {}",
                Self::MAX_POINTS
            )));
        }
        Ok(())
    }

    /// Number of coordinates along one axis, as a float so huge counts do not saturate
    fn axis_len(lo: f64, hi: f64, delta: f64) -> f64 {
        // Small slack so an end point that is a whole number of steps away is kept
        ((hi - lo) / delta + 1e-9).floor() + 1.0
    }

    /// Coordinates along one axis: start, start + delta, ... while <= end
    fn axis(lo: f64, hi: f64, delta: f64) -> Vec<f64> {
        let n = Self::axis_len(lo, hi, delta) as usize;
        (0..n).map(|i| lo + i as f64 * delta).collect()
    }

    /// Grid points, row by row. Call [`GridSpec::validate`] first: an
    /// unvalidated grid may expand to more points than fit in memory.
    pub fn points(&self) -> Vec<NVec3> {
        let xs = Self::axis(self.x_range[0], self.x_range[1], self.delta_x);
        let ys = Self::axis(self.y_range[0], self.y_range[1], self.delta_y);
        let mut out = Vec::with_capacity(xs.len() * ys.len());
        for &y in &ys {
            for &x in &xs {
                out.push(NVec3::new(x, y, self.z));
            }
        }
        out
    }
}

/// One arrow of a sampled field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub point: NVec3,
    pub vector: NVec3,
}

/// Evaluate `field` at every grid point, row by row (y outer, x inner)
pub fn sample_grid<F: VectorField + ?Sized>(field: &F, grid: &GridSpec) -> Result<Vec<FieldSample>, ConfigError> {
    grid.validate()?;
    Ok(grid
        .points()
        .into_iter()
        .map(|point| FieldSample {
            point,
            vector: field.evaluate(&point),
        })
        .collect())
}
