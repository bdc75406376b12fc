//! Orbital motion along a closed path
//!
//! [`Orbiting`] moves a body around a [`Path`] at a rate inversely
//! proportional to its distance from a [`Center`], so bodies speed up near
//! the center and slow down far from it. The only persistent state is the
//! fraction of the way around the path; the body's position is always
//! recomputed from the path, so numerical error never pulls it off the curve.

use log::trace;

use crate::error::{ConfigError, DegenerateGeometry, StepError};
use crate::simulation::path::Path;
use crate::simulation::states::{Body, Center};

/// How the local path speed (arc length per unit fraction) is estimated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedProbe {
    /// Distance between the path at `f` and at `f + d_prop`, divided by `d_prop`.
    /// Costs one extra path evaluation per tick.
    FiniteDifference { d_prop: f64 },
    /// Norm of the path's closed-form derivative
    Analytic,
}

impl Default for SpeedProbe {
    fn default() -> Self {
        SpeedProbe::FiniteDifference { d_prop: OrbitState::DEFAULT_D_PROP }
    }
}

/// Persistent orbit state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub fraction: f64, // in [0, 1), wraps around the path
    pub base_rate: f64, // > 0, fixed after construction
}

impl OrbitState {
    pub const DEFAULT_FRACTION: f64 = 0.75;
    pub const DEFAULT_RATE: f64 = 7.5;
    pub const DEFAULT_D_PROP: f64 = 0.001;
}

/// Orbit updater for a single body
#[derive(Debug, Clone)]
pub struct Orbiting<P: Path> {
    path: P,
    state: OrbitState,
    probe: SpeedProbe,
}

impl<P: Path> Orbiting<P> {
    /// Orbit along `path` starting at the default fraction (0.75).
    pub fn new(path: P, base_rate: f64) -> Result<Self, ConfigError> {
        if !(base_rate.is_finite() && base_rate > 0.0) {
            return Err(ConfigError::NonPositiveRate(base_rate));
        }
        Ok(Self {
            path,
            state: OrbitState {
                fraction: OrbitState::DEFAULT_FRACTION,
                base_rate,
            },
            probe: SpeedProbe::default(),
        })
    }

    pub fn with_fraction(mut self, fraction: f64) -> Result<Self, ConfigError> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(ConfigError::FractionOutOfRange(fraction));
        }
        self.state.fraction = fraction;
        Ok(self)
    }

    pub fn with_probe(mut self, probe: SpeedProbe) -> Result<Self, ConfigError> {
        match probe {
            SpeedProbe::FiniteDifference { d_prop } => {
                if !(d_prop > 0.0 && d_prop < 1.0) {
                    return Err(ConfigError::InvalidProbeStep(d_prop));
                }
            }
            SpeedProbe::Analytic => {
                if self.path.derivative_at_fraction(self.state.fraction).is_none() {
                    return Err(ConfigError::NoAnalyticDerivative);
                }
            }
        }
        self.probe = probe;
        Ok(self)
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    pub fn fraction(&self) -> f64 {
        self.state.fraction
    }

    pub fn path(&self) -> &P {
        &self.path
    }

    pub fn probe(&self) -> SpeedProbe {
        self.probe
    }

    /// Move `body` onto the path at the current fraction.
    pub fn place(&self, body: &mut Body) {
        body.x = self.path.point_at_fraction(self.state.fraction);
    }

    /// Advance the body by `dt` of simulation time.
    ///
    /// The center and body are borrowed per tick rather than held, so a
    /// `System` can own them while several orbits update it in turn.
    /// `dt == 0` returns immediately without touching anything.
    pub fn advance(&mut self, dt: f64, center: &Center, body: &mut Body) -> Result<(), StepError> {
        if dt == 0.0 {
            return Ok(());
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(StepError::InvalidTimeStep(dt));
        }

        let delta = self.fraction_increment(dt, center, body)?;
        self.apply_increment(delta, body);
        Ok(())
    }

    /// Move the fraction forward by `delta` (wrapping) and reposition `body`.
    pub fn apply_increment(&mut self, delta: f64, body: &mut Body) {
        let next = (self.state.fraction + delta).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for values just below a whole turn
        let next = if next >= 1.0 { 0.0 } else { next };
        if next < self.state.fraction {
            trace!("orbit wrapped: {} -> {}", self.state.fraction, next);
        }

        self.state.fraction = next;
        body.x = self.path.point_at_fraction(next);
    }

    /// Fraction increment for one tick, without applying it
    pub fn fraction_increment(&self, dt: f64, center: &Center, body: &Body) -> Result<f64, DegenerateGeometry> {
        let radius_vector = body.x - center.x;
        let r = radius_vector.norm();
        if r == 0.0 {
            return Err(DegenerateGeometry::BodyAtCenter);
        }
        let rate = self.state.base_rate / r;

        let f = self.state.fraction;
        let increment = match self.probe {
            SpeedProbe::FiniteDifference { d_prop } => {
                let ds = (self.path.point_at_fraction((f + d_prop) % 1.0) - self.path.point_at_fraction(f)).norm();
                if ds == 0.0 {
                    return Err(DegenerateGeometry::ZeroPathSpeed { fraction: f });
                }
                (d_prop / ds) * rate * dt
            }
            SpeedProbe::Analytic => {
                let speed = self
                    .path
                    .derivative_at_fraction(f)
                    .map(|d| d.norm())
                    .unwrap_or(0.0);
                if speed == 0.0 {
                    return Err(DegenerateGeometry::ZeroPathSpeed { fraction: f });
                }
                rate * dt / speed
            }
        };
        Ok(increment)
    }
}
