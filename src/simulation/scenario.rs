//! Build fully-initialized scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - run parameters (`Parameters`)
//! - system state (`System` with bodies placed on their paths at t = 0)
//! - one `OrbitBinding` per body, tying an orbit updater to its body and center
//! - the optional force field and its sampling grid
//!
//! Everything is validated here, so a built scenario only fails at run time
//! on degenerate geometry.

use log::{debug, info};

use crate::configuration::config::{to_nvec3, BodyConfig, FieldConfig, PathConfig, ProbeConfig, ScenarioConfig};
use crate::error::{ConfigError, StepError};
use crate::simulation::field::{FieldSampler, GridSpec, SamplerConfig, Source};
use crate::simulation::orbit::{Orbiting, SpeedProbe};
use crate::simulation::params::Parameters;
use crate::simulation::path::{Ellipse, PathShape, Polyline};
use crate::simulation::states::{Body, Center, System};

/// An orbit updater and the indices of the body it moves and the center it reads
#[derive(Debug, Clone)]
pub struct OrbitBinding {
    pub name: String,
    pub body: usize, // index into `System::bodies`
    pub center: usize, // index into `System::centers`
    pub orbit: Orbiting<PathShape>,
}

/// Runtime bundle built from a [`ScenarioConfig`]
#[derive(Debug)]
pub struct Scenario {
    pub parameters: Parameters,
    pub system: System,
    pub orbits: Vec<OrbitBinding>,
    pub field: Option<FieldSampler>,
    pub grid: Option<GridSpec>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        if !(p_cfg.h0.is_finite() && p_cfg.h0 > 0.0) {
            return Err(ConfigError::InvalidParameters(format!("h0 must be positive, got {}", p_cfg.h0)));
        }
        if !(p_cfg.t_end.is_finite() && p_cfg.t_end >= 0.0) {
            return Err(ConfigError::InvalidParameters(format!("t_end must be non-negative, got {}", p_cfg.t_end)));
        }
        let parameters = Parameters {
            t_end: p_cfg.t_end,
            h0: p_cfg.h0,
            trace_every: p_cfg.trace_every.max(1),
        };

        // Centers: map `CenterConfig` -> runtime `Center`
        let mut center_names = Vec::with_capacity(cfg.centers.len());
        let mut centers = Vec::with_capacity(cfg.centers.len());
        for c in &cfg.centers {
            centers.push(Center::new(to_nvec3("centers.x", &c.x)?));
            center_names.push(c.name.as_str());
        }

        // Bodies: one orbit binding per body, body placed at its starting fraction
        let mut bodies = Vec::with_capacity(cfg.bodies.len());
        let mut orbits = Vec::with_capacity(cfg.bodies.len());
        for (i, bc) in cfg.bodies.iter().enumerate() {
            let center = center_names
                .iter()
                .position(|name| *name == bc.center)
                .ok_or_else(|| ConfigError::UnknownCenter {
                    body: bc.name.clone(),
                    center: bc.center.clone(),
                })?;

            let orbit = build_orbit(bc)?;
            let mut body = Body::new(centers[center].x);
            orbit.place(&mut body);
            debug!("body `{}` starts at fraction {} ({:?})", bc.name, orbit.fraction(), body.x);

            bodies.push(body);
            orbits.push(OrbitBinding {
                name: bc.name.clone(),
                body: i,
                center,
                orbit,
            });
        }

        let (field, grid) = match cfg.field {
            Some(f_cfg) => {
                let (field, grid) = build_field(f_cfg)?;
                (Some(field), grid)
            }
            None => (None, None),
        };

        info!(
            "scenario built: {} bodies, {} centers, field: {}",
            bodies.len(),
            centers.len(),
            field.as_ref().map_or(0, |f| f.sources().len())
        );

        Ok(Self {
            parameters,
            system: System { bodies, centers, t: 0.0 },
            orbits,
            field,
            grid,
        })
    }

    /// Advance every orbit by one fixed step `h0`
    ///
    /// All increments are computed before any body moves, so a failing
    /// binding leaves the whole system at the previous tick.
    pub fn step(&mut self) -> Result<(), StepError> {
        let dt = self.parameters.h0;
        let System { bodies, centers, t } = &mut self.system;

        let increments = self
            .orbits
            .iter()
            .map(|binding| {
                binding
                    .orbit
                    .fraction_increment(dt, &centers[binding.center], &bodies[binding.body])
                    .map_err(|e| StepError::Body {
                        body: binding.name.clone(),
                        source: Box::new(e.into()),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (binding, delta) in self.orbits.iter_mut().zip(increments) {
            binding.orbit.apply_increment(delta, &mut bodies[binding.body]);
        }

        *t += dt;
        Ok(())
    }

    /// Step until `t_end`, calling `observe` after each step with the step count
    pub fn run<F>(&mut self, mut observe: F) -> Result<(), StepError>
    where
        F: FnMut(usize, &Scenario),
    {
        let steps = self.parameters.steps();
        info!("running {} steps of h0 = {}", steps, self.parameters.h0);
        for n in 1..=steps {
            self.step()?;
            observe(n, self);
        }
        Ok(())
    }
}

fn build_path(cfg: &PathConfig) -> Result<PathShape, ConfigError> {
    let shape: PathShape = match cfg {
        PathConfig::Ellipse { center, a, b, rotation } => {
            Ellipse::new(to_nvec3("path.center", center)?, *a, *b, *rotation)?.into()
        }
        PathConfig::Circle { center, radius } => Ellipse::circle(to_nvec3("path.center", center)?, *radius)?.into(),
        PathConfig::FocusEllipse { focus, a, b } => {
            Ellipse::with_right_focus(to_nvec3("path.focus", focus)?, *a, *b)?.into()
        }
        PathConfig::Polyline { points } => {
            let points = points
                .iter()
                .map(|p| to_nvec3("path.points", p))
                .collect::<Result<Vec<_>, _>>()?;
            Polyline::new(points)?.into()
        }
    };
    Ok(shape)
}

fn build_orbit(cfg: &BodyConfig) -> Result<Orbiting<PathShape>, ConfigError> {
    let path = build_path(&cfg.path)?;
    let mut orbit = Orbiting::new(path, cfg.rate)?;
    if let Some(fraction) = cfg.fraction {
        orbit = orbit.with_fraction(fraction)?;
    }
    if let Some(probe) = cfg.probe {
        let probe = match probe {
            ProbeConfig::FiniteDifference { d_prop } => SpeedProbe::FiniteDifference { d_prop },
            ProbeConfig::Analytic => SpeedProbe::Analytic,
        };
        orbit = orbit.with_probe(probe)?;
    }
    Ok(orbit)
}

fn build_field(cfg: FieldConfig) -> Result<(FieldSampler, Option<GridSpec>), ConfigError> {
    let sources = cfg
        .sources
        .iter()
        .map(|s| -> Result<Source, ConfigError> {
            Ok(Source::new(to_nvec3("field.sources.position", &s.position)?, s.strength))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let field = FieldSampler::require_sources(sources, SamplerConfig { near_radius: cfg.near_radius })?;

    let grid = match cfg.grid {
        Some(g) => {
            let grid = GridSpec {
                x_range: g.x_range,
                y_range: g.y_range,
                delta_x: g.delta_x,
                delta_y: g.delta_y,
                z: g.z,
            };
            grid.validate()?;
            Some(grid)
        }
        None => None,
    };

    Ok((field, grid))
}
