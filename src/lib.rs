pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Body, Center, System, NVec3};
pub use simulation::path::{Path, Ellipse, Polyline, PathShape};
pub use simulation::orbit::{Orbiting, OrbitState, SpeedProbe};
pub use simulation::field::{FieldSampler, FieldSet, Source, SamplerConfig, VectorField, GridSpec, FieldSample, sample_grid};
pub use simulation::params::Parameters;
pub use simulation::scenario::{Scenario, OrbitBinding};

pub use configuration::config::{ScenarioConfig, ParametersConfig, CenterConfig, BodyConfig, PathConfig, ProbeConfig, FieldConfig, SourceConfig, GridConfig};

pub use error::{ConfigError, DegenerateGeometry, StepError};

pub use benchmark::benchmark::{bench_field, bench_orbit, bench_field_curve};
