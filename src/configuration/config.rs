//! Configuration types for loading orbit/field scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ParametersConfig`] – step size, end time and trace interval
//! - [`CenterConfig`]     – named reference points bodies orbit around
//! - [`BodyConfig`]       – one orbiting body: its center, rate and path
//! - [`FieldConfig`]      – optional inverse-square field and sampling grid
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! parameters:
//!   t_end: 30.0             # total simulation time
//!   h0: 0.0166667           # fixed step size
//!   trace_every: 60         # print a trace row every n steps
//!
//! centers:
//!   - name: sun
//!     x: [3.0, 0.0, 0.0]
//!
//! bodies:
//!   - name: comet
//!     center: sun
//!     rate: 5.0
//!     fraction: 0.75        # optional
//!     probe: { kind: finite_difference, d_prop: 0.001 }   # optional
//!     path: { kind: focus_ellipse, focus: [3.0, 0.0, 0.0], a: 3.5, b: 2.0 }
//!
//! field:
//!   near_radius: 0.5
//!   sources:
//!     - { position: [-1.5, 0.0, 0.0], strength: -4.0 }
//!   grid: { x_range: [-7.0, 7.0], y_range: [-4.0, 4.0], delta_x: 0.5, delta_y: 0.5 }
//! ```
//!
//! The scenario builder maps this into runtime types and validates it there.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::simulation::states::NVec3;

/// Run parameters
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64, // time step size
    #[serde(default = "default_trace_every")]
    pub trace_every: usize, // print a trace row every n steps
}

fn default_trace_every() -> usize {
    1
}

/// A named reference point
#[derive(Deserialize, Debug, Clone)]
pub struct CenterConfig {
    pub name: String,
    pub x: Vec<f64>, // position
}

/// Path geometry, tagged by `kind`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathConfig {
    Ellipse {
        center: Vec<f64>,
        a: f64,
        b: f64,
        #[serde(default)]
        rotation: f64, // radians
    },
    Circle {
        center: Vec<f64>,
        radius: f64,
    },
    /// Ellipse whose +x focus sits on `focus`
    FocusEllipse {
        focus: Vec<f64>,
        a: f64,
        b: f64,
    },
    Polyline {
        points: Vec<Vec<f64>>,
    },
}

/// Local path speed estimate used by the orbit updater
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeConfig {
    FiniteDifference { d_prop: f64 },
    Analytic,
}

/// One orbiting body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub center: String, // name of a `CenterConfig`
    pub rate: f64, // base rate, > 0
    pub fraction: Option<f64>, // starting fraction, defaults to 0.75
    pub probe: Option<ProbeConfig>,
    pub path: PathConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SourceConfig {
    pub position: Vec<f64>,
    pub strength: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GridConfig {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub delta_x: f64,
    pub delta_y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FieldConfig {
    pub near_radius: f64,
    pub sources: Vec<SourceConfig>,
    pub grid: Option<GridConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub centers: Vec<CenterConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    pub field: Option<FieldConfig>,
}

/// Convert a YAML list into a 3-vector
pub fn to_nvec3(field: &'static str, v: &[f64]) -> Result<NVec3, ConfigError> {
    match v {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(ConfigError::Dimension { field, len: v.len() }),
    }
}
