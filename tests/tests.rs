use std::f64::consts::TAU;

use orbitsim::simulation::path::Path;
use orbitsim::{
    sample_grid, Body, Center, ConfigError, DegenerateGeometry, Ellipse, FieldSampler, FieldSet, GridSpec, NVec3,
    Orbiting, Polyline, SamplerConfig, Scenario, ScenarioConfig, Source, SpeedProbe, StepError, VectorField,
};

/// Unit circle around the origin
pub fn unit_circle() -> Ellipse {
    Ellipse::circle(NVec3::zeros(), 1.0).unwrap()
}

/// Orbit on `path` with its body already placed at the starting fraction
pub fn placed_orbit<P: Path>(path: P, rate: f64, fraction: f64) -> (Orbiting<P>, Body) {
    let orbit = Orbiting::new(path, rate).unwrap().with_fraction(fraction).unwrap();
    let mut body = Body::new(NVec3::zeros());
    orbit.place(&mut body);
    (orbit, body)
}

pub fn origin() -> Center {
    Center::new(NVec3::zeros())
}

/// Field sampler from (position, strength) pairs
pub fn sampler(sources: &[([f64; 3], f64)], near_radius: f64) -> FieldSampler {
    let sources = sources
        .iter()
        .map(|(p, s)| Source::new(NVec3::new(p[0], p[1], p[2]), *s))
        .collect();
    FieldSampler::new(sources, SamplerConfig { near_radius }).unwrap()
}

/// Path that never moves, for degenerate sampling
#[derive(Debug, Clone)]
struct Stuck;

impl Path for Stuck {
    fn point_at_fraction(&self, _f: f64) -> NVec3 {
        NVec3::new(2.0, 0.0, 0.0)
    }
}

// ==================================================================================
// Orbit tests
// ==================================================================================

#[test]
fn orbit_unit_circle_single_step() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 1.0, 0.75);
    let before = orbit.fraction();

    orbit.advance(0.01, &origin(), &mut body).unwrap();

    let delta = orbit.fraction() - before;
    assert!(delta > 0.0 && delta < 0.01, "unexpected step {}", delta);
    // speed on the unit circle is 2π per unit fraction and r = 1
    assert!((delta - 0.01 / TAU).abs() < 1e-8, "expected ~{}, got {}", 0.01 / TAU, delta);
    assert_eq!(body.x, orbit.path().point_at_fraction(orbit.fraction()));
}

#[test]
fn orbit_zero_step_is_noop() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 3.0, 0.3);
    let fraction = orbit.fraction();
    let x = body.x;

    orbit.advance(0.0, &origin(), &mut body).unwrap();

    assert_eq!(orbit.fraction().to_bits(), fraction.to_bits());
    assert_eq!(body.x, x);

    // no geometry is read either: a body sitting on its center does not fail
    let on_body = Center::new(body.x);
    assert!(orbit.advance(0.0, &on_body, &mut body).is_ok());
}

#[test]
fn orbit_fraction_stays_in_range() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 7.5, 0.75);
    let dts = [0.0, 1e-6, 0.016, 0.37, 5.0, 123.0];

    for i in 0..1200 {
        let dt = dts[i % dts.len()];
        orbit.advance(dt, &origin(), &mut body).unwrap();
        let f = orbit.fraction();
        assert!((0.0..1.0).contains(&f), "fraction {} left [0, 1) at step {}", f, i);
    }
}

#[test]
fn orbit_moves_forward() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 1.0, 0.1);

    let mut last = orbit.fraction();
    for _ in 0..100 {
        orbit.advance(0.001, &origin(), &mut body).unwrap();
        assert!(orbit.fraction() > last, "fraction did not increase");
        last = orbit.fraction();
    }
}

#[test]
fn orbit_rate_scales_increment() {
    let (slow, body) = placed_orbit(unit_circle(), 1.0, 0.2);
    let (fast, _) = placed_orbit(unit_circle(), 2.0, 0.2);

    let d1 = slow.fraction_increment(0.05, &origin(), &body).unwrap();
    let d2 = fast.fraction_increment(0.05, &origin(), &body).unwrap();

    assert!((d2 / d1 - 2.0).abs() < 1e-12, "expected 2x, got {}", d2 / d1);
}

#[test]
fn orbit_faster_near_center() {
    // Sun on the right focus: perihelion at fraction 0, aphelion at 0.5
    let focus = NVec3::new(3.0, 0.0, 0.0);
    let sun = Center::new(focus);
    let ellipse = Ellipse::with_right_focus(focus, 3.5, 2.0).unwrap();

    let (near, near_body) = placed_orbit(&ellipse, 5.0, 0.0);
    let (far, far_body) = placed_orbit(&ellipse, 5.0, 0.5);

    let ratio = near.fraction_increment(0.01, &sun, &near_body).unwrap()
        / far.fraction_increment(0.01, &sun, &far_body).unwrap();

    // same local path speed at both vertices, so only 1/r differs
    let c = (3.5f64 * 3.5 - 2.0 * 2.0).sqrt();
    let expected = (3.5 + c) / (3.5 - c);
    assert!((ratio / expected - 1.0).abs() < 1e-6, "expected {}, got {}", expected, ratio);
}

#[test]
fn orbit_analytic_probe_matches_finite_difference() {
    let ellipse = Ellipse::new(NVec3::new(0.5, -0.25, 0.0), 3.0, 1.5, 0.4).unwrap();
    let (fd, body) = placed_orbit(&ellipse, 2.0, 0.3);
    let analytic = Orbiting::new(&ellipse, 2.0)
        .unwrap()
        .with_fraction(0.3)
        .unwrap()
        .with_probe(SpeedProbe::Analytic)
        .unwrap();

    let a = fd.fraction_increment(0.02, &origin(), &body).unwrap();
    let b = analytic.fraction_increment(0.02, &origin(), &body).unwrap();

    assert!((a / b - 1.0).abs() < 1e-2, "finite difference {} vs analytic {}", a, b);
}

#[test]
fn orbit_body_at_center_fails() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 1.0, 0.0);
    let center = Center::new(body.x);
    let before = body.x;

    let err = orbit.advance(0.01, &center, &mut body).unwrap_err();

    assert_eq!(err, StepError::Degenerate(DegenerateGeometry::BodyAtCenter));
    assert_eq!(body.x, before);
    assert_eq!(orbit.fraction(), 0.0);
}

#[test]
fn orbit_zero_path_speed_fails() {
    let (mut orbit, mut body) = placed_orbit(Stuck, 1.0, 0.75);

    let err = orbit.advance(0.01, &origin(), &mut body).unwrap_err();

    assert_eq!(err, StepError::Degenerate(DegenerateGeometry::ZeroPathSpeed { fraction: 0.75 }));
}

#[test]
fn orbit_rejects_bad_configuration() {
    for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(Orbiting::new(unit_circle(), rate), Err(ConfigError::NonPositiveRate(_))));
    }

    let orbit = Orbiting::new(unit_circle(), 1.0).unwrap();
    assert_eq!(orbit.clone().with_fraction(1.0).unwrap_err(), ConfigError::FractionOutOfRange(1.0));
    assert_eq!(orbit.clone().with_fraction(-0.1).unwrap_err(), ConfigError::FractionOutOfRange(-0.1));
    assert_eq!(
        orbit.with_probe(SpeedProbe::FiniteDifference { d_prop: 0.0 }).unwrap_err(),
        ConfigError::InvalidProbeStep(0.0)
    );

    let stuck = Orbiting::new(Stuck, 1.0).unwrap();
    assert_eq!(stuck.with_probe(SpeedProbe::Analytic).unwrap_err(), ConfigError::NoAnalyticDerivative);
}

#[test]
fn orbit_rejects_negative_step() {
    let (mut orbit, mut body) = placed_orbit(unit_circle(), 1.0, 0.5);
    assert_eq!(orbit.advance(-0.1, &origin(), &mut body).unwrap_err(), StepError::InvalidTimeStep(-0.1));
}

// ==================================================================================
// Path tests
// ==================================================================================

#[test]
fn ellipse_focus_lands_on_requested_point() {
    let focus = NVec3::new(3.0, 0.0, 0.0);
    let ellipse = Ellipse::with_right_focus(focus, 3.5, 2.0).unwrap();

    let [right, left] = ellipse.foci();
    let c = (3.5f64 * 3.5 - 2.0 * 2.0).sqrt();

    assert!((right - focus).norm() < 1e-12);
    assert!((left - (focus - NVec3::new(2.0 * c, 0.0, 0.0))).norm() < 1e-12);
    assert!(Ellipse::with_right_focus(focus, 1.0, 2.0).is_err());
}

#[test]
fn polyline_is_parametrised_by_arc_length() {
    let square = Polyline::new(vec![
        NVec3::new(0.0, 0.0, 0.0),
        NVec3::new(1.0, 0.0, 0.0),
        NVec3::new(1.0, 1.0, 0.0),
        NVec3::new(0.0, 1.0, 0.0),
    ])
    .unwrap();

    assert_eq!(square.perimeter(), 4.0);
    assert_eq!(square.point_at_fraction(0.125), NVec3::new(0.5, 0.0, 0.0));
    assert_eq!(square.point_at_fraction(0.5), NVec3::new(1.0, 1.0, 0.0));
    assert_eq!(square.point_at_fraction(0.875), NVec3::new(0.0, 0.5, 0.0));
    assert_eq!(square.point_at_fraction(1.125), NVec3::new(0.5, 0.0, 0.0));
}

#[test]
fn polyline_rejects_degenerate_input() {
    assert!(Polyline::new(vec![NVec3::zeros(), NVec3::x()]).is_err());
    assert!(Polyline::new(vec![NVec3::zeros(); 4]).is_err());
}

// ==================================================================================
// Field tests
// ==================================================================================

#[test]
fn field_two_source_literal() {
    let field = sampler(&[([-1.0, 0.0, 0.0], 4.0), ([1.0, 0.0, 0.0], 1.0)], 0.1);

    let v = field.evaluate(&NVec3::zeros());

    // (4, 0, 0) from the left source, (-1, 0, 0) from the right one
    assert_eq!(v, NVec3::new(3.0, 0.0, 0.0));
}

#[test]
fn field_superposition() {
    let a = ([0.3, -1.2, 0.5], -2.5);
    let b = ([-0.7, 0.4, 1.1], 0.8);
    let both = sampler(&[a, b], 0.25);
    let only_a = sampler(&[a], 0.25);
    let only_b = sampler(&[b], 0.25);

    for q in [NVec3::zeros(), NVec3::new(0.31, -1.1, 0.45), NVec3::new(4.0, 2.0, -3.0)] {
        let sum = only_a.evaluate(&q) + only_b.evaluate(&q);
        assert!((both.evaluate(&q) - sum).norm() < 1e-12, "superposition broken at {:?}", q);
    }
}

#[test]
fn field_set_sums_terms() {
    let a = sampler(&[([1.0, 0.0, 0.0], -4.0)], 0.5);
    let b = sampler(&[([0.0, 2.0, 0.0], 1.5)], 0.5);
    let q = NVec3::new(-0.5, 0.5, 0.0);
    let expected = a.evaluate(&q) + b.evaluate(&q);

    let set = FieldSet::new().with(a).with(b);

    assert_eq!(set.len(), 2);
    assert!((set.evaluate(&q) - expected).norm() < 1e-12);
}

#[test]
fn field_clamp_is_continuous() {
    let r = 0.5;
    let field = sampler(&[([0.0, 0.0, 0.0], 1.0)], r);

    for eps in [1e-3, 1e-6, 1e-9] {
        let inside = field.evaluate(&NVec3::new(r - eps, 0.0, 0.0)).norm();
        let outside = field.evaluate(&NVec3::new(r + eps, 0.0, 0.0)).norm();
        assert!((inside - outside).abs() < 20.0 * eps, "jump of {} at eps = {}", (inside - outside).abs(), eps);
    }

    // boundary takes the inverse-square branch: 1 / r^2
    let at = field.evaluate(&NVec3::new(r, 0.0, 0.0)).norm();
    assert!((at - 1.0 / (r * r)).abs() < 1e-12);
}

#[test]
fn field_clamp_is_linear_inside() {
    let field = sampler(&[([0.0, 0.0, 0.0], -1.0)], 1.0);

    let a = field.evaluate(&NVec3::new(0.2, 0.0, 0.0));
    let b = field.evaluate(&NVec3::new(0.4, 0.0, 0.0));

    assert!((b.norm() / a.norm() - 2.0).abs() < 1e-12);
    // negative strength points toward the source
    assert!(a.x < 0.0);
}

#[test]
fn field_inverse_square_law() {
    let field = sampler(&[([0.0, 0.0, 0.0], 2.0)], 0.1);

    let near = field.evaluate(&NVec3::new(0.0, 1.0, 0.0)).norm();
    let far = field.evaluate(&NVec3::new(0.0, 2.0, 0.0)).norm();

    assert!((near / far - 4.0).abs() < 1e-12, "Expected 4x, got {}", near / far);
}

#[test]
fn field_skips_exact_overlap() {
    let field = sampler(&[([1.5, -2.0, 0.25], 3.0)], 0.5);
    assert_eq!(field.evaluate(&NVec3::new(1.5, -2.0, 0.25)), NVec3::zeros());
}

#[test]
fn field_rejects_bad_configuration() {
    for r in [0.0, -0.5, f64::NAN] {
        assert!(matches!(
            FieldSampler::new(vec![], SamplerConfig { near_radius: r }),
            Err(ConfigError::NonPositiveNearRadius(_))
        ));
    }
    assert_eq!(
        FieldSampler::require_sources(vec![], SamplerConfig::default()).unwrap_err(),
        ConfigError::NoSources
    );

    // empty is fine when not required
    let empty = FieldSampler::new(vec![], SamplerConfig::default()).unwrap();
    assert_eq!(empty.evaluate(&NVec3::new(1.0, 2.0, 3.0)), NVec3::zeros());
}

#[test]
fn field_grid_sampling() {
    let field = sampler(&[([0.0, 0.0, 0.0], -1.0)], 0.5);
    let grid = GridSpec {
        x_range: [-1.0, 1.0],
        y_range: [0.0, 1.0],
        delta_x: 0.5,
        delta_y: 0.5,
        z: 0.25,
    };

    let samples = sample_grid(&field, &grid).unwrap();

    assert_eq!(samples.len(), 15);
    assert_eq!(samples[0].point, NVec3::new(-1.0, 0.0, 0.25));
    assert_eq!(samples[14].point, NVec3::new(1.0, 1.0, 0.25));
    for s in &samples {
        assert_eq!(s.vector, field.evaluate(&s.point));
    }

    let bad = GridSpec { delta_x: 0.0, ..grid };
    assert!(matches!(sample_grid(&field, &bad), Err(ConfigError::InvalidGrid(_))));
}

#[test]
fn field_grid_rejects_oversized_grid() {
    let field = sampler(&[([0.0, 0.0, 0.0], -1.0)], 0.5);
    let dense = GridSpec {
        x_range: [-7.0, 7.0],
        y_range: [-4.0, 4.0],
        delta_x: 1e-300,
        delta_y: 0.5,
        z: 0.0,
    };

    assert!(matches!(dense.validate(), Err(ConfigError::InvalidGrid(_))));
    assert!(matches!(sample_grid(&field, &dense), Err(ConfigError::InvalidGrid(_))));

    // just over the limit along one axis
    let wide = GridSpec {
        x_range: [0.0, GridSpec::MAX_POINTS as f64],
        y_range: [0.0, 0.0],
        delta_x: 1.0,
        delta_y: 1.0,
        z: 0.0,
    };
    assert!(matches!(wide.validate(), Err(ConfigError::InvalidGrid(_))));
}

// ==================================================================================
// Scenario tests
// ==================================================================================

const SCENARIO: &str = r#"
parameters:
  t_end: 0.1
  h0: 0.01
centers:
  - name: sun
    x: [3.0, 0.0, 0.0]
  - name: star
    x: [0.0, 0.0, 0.0]
bodies:
  - name: comet
    center: sun
    rate: 5.0
    path: { kind: focus_ellipse, focus: [3.0, 0.0, 0.0], a: 3.5, b: 2.0 }
  - name: moon
    center: star
    rate: 1.0
    fraction: 0.0
    probe: { kind: analytic }
    path: { kind: circle, center: [0.0, 0.0, 0.0], radius: 1.0 }
  - name: rock
    center: star
    rate: 2.0
    path:
      kind: polyline
      points: [[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [-3.0, 0.0, 0.0], [0.0, -2.0, 0.0]]
field:
  near_radius: 0.5
  sources:
    - { position: [-1.5, 0.0, 0.0], strength: -4.0 }
    - { position: [1.5, 0.0, 0.0], strength: -0.25 }
  grid: { x_range: [-7.0, 7.0], y_range: [-4.0, 4.0], delta_x: 0.5, delta_y: 0.5 }
"#;

pub fn load(yaml: &str) -> ScenarioConfig {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn scenario_builds_and_runs() {
    let mut scenario = Scenario::build_scenario(load(SCENARIO)).unwrap();

    assert_eq!(scenario.system.bodies.len(), 3);
    assert_eq!(scenario.system.centers.len(), 2);
    assert_eq!(scenario.orbits[0].orbit.fraction(), 0.75);
    assert_eq!(scenario.field.as_ref().map(|f| f.sources().len()), Some(2));
    assert!(scenario.grid.is_some());

    let start: Vec<f64> = scenario.orbits.iter().map(|b| b.orbit.fraction()).collect();

    let mut calls = 0;
    scenario.run(|_, _| calls += 1).unwrap();

    assert_eq!(calls, 10);
    assert!((scenario.system.t - 0.1).abs() < 1e-12);
    for (binding, f0) in scenario.orbits.iter().zip(start) {
        assert_ne!(binding.orbit.fraction(), f0, "{} did not move", binding.name);
        let x = scenario.system.bodies[binding.body].x;
        assert_eq!(x, binding.orbit.path().point_at_fraction(binding.orbit.fraction()));
    }
}

#[test]
fn scenario_unknown_center() {
    let mut cfg = load(SCENARIO);
    cfg.bodies[1].center = "nowhere".into();

    let err = Scenario::build_scenario(cfg).unwrap_err();

    assert_eq!(
        err,
        ConfigError::UnknownCenter {
            body: "moon".into(),
            center: "nowhere".into()
        }
    );
}

#[test]
fn scenario_rejects_wrong_dimension() {
    let mut cfg = load(SCENARIO);
    cfg.centers[0].x = vec![1.0, 2.0];

    assert_eq!(
        Scenario::build_scenario(cfg).unwrap_err(),
        ConfigError::Dimension { field: "centers.x", len: 2 }
    );
}

#[test]
fn scenario_rejects_field_without_sources() {
    let mut cfg = load(SCENARIO);
    if let Some(field) = cfg.field.as_mut() {
        field.sources.clear();
    }

    assert_eq!(Scenario::build_scenario(cfg).unwrap_err(), ConfigError::NoSources);
}

#[test]
fn scenario_step_reports_failing_body() {
    let yaml = r#"
parameters: { t_end: 1.0, h0: 0.1 }
centers:
  - { name: edge, x: [1.0, 0.0, 0.0] }
bodies:
  - name: crash
    center: edge
    rate: 1.0
    fraction: 0.0
    path: { kind: circle, center: [0.0, 0.0, 0.0], radius: 1.0 }
"#;
    let mut scenario = Scenario::build_scenario(load(yaml)).unwrap();

    let err = scenario.step().unwrap_err();

    match err {
        StepError::Body { body, source } => {
            assert_eq!(body, "crash");
            assert_eq!(*source, StepError::Degenerate(DegenerateGeometry::BodyAtCenter));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(scenario.system.t, 0.0);
}

#[test]
fn scenario_failed_step_moves_no_body() {
    let yaml = r#"
parameters: { t_end: 1.0, h0: 0.1 }
centers:
  - { name: star, x: [0.0, 0.0, 0.0] }
  - { name: edge, x: [1.0, 0.0, 0.0] }
bodies:
  - name: ok
    center: star
    rate: 1.0
    path: { kind: circle, center: [0.0, 0.0, 0.0], radius: 1.0 }
  - name: crash
    center: edge
    rate: 1.0
    fraction: 0.0
    path: { kind: circle, center: [0.0, 0.0, 0.0], radius: 1.0 }
"#;
    let mut scenario = Scenario::build_scenario(load(yaml)).unwrap();
    let fractions: Vec<f64> = scenario.orbits.iter().map(|b| b.orbit.fraction()).collect();
    let positions: Vec<NVec3> = scenario.system.bodies.iter().map(|b| b.x).collect();

    let err = scenario.step().unwrap_err();

    assert!(matches!(err, StepError::Body { ref body, .. } if body == "crash"));
    assert_eq!(scenario.system.t, 0.0);
    for (binding, f0) in scenario.orbits.iter().zip(&fractions) {
        assert_eq!(binding.orbit.fraction(), *f0, "{} moved on a failed step", binding.name);
    }
    for (body, x0) in scenario.system.bodies.iter().zip(&positions) {
        assert_eq!(body.x, *x0);
    }

    // once the offending center is moved the step goes through, each body advancing once
    scenario.system.centers[1].x = NVec3::new(0.0, 0.0, 0.0);
    scenario.step().unwrap();
    let ok = &scenario.orbits[0];
    let step = ok.orbit.fraction() - fractions[0];
    assert!((step - 0.1 / TAU).abs() < 1e-6, "expected one step of ~{}, got {}", 0.1 / TAU, step);
}
