use std::time::Instant;

use crate::simulation::field::{sample_grid, FieldSampler, GridSpec, SamplerConfig, Source};
use crate::simulation::orbit::{Orbiting, SpeedProbe};
use crate::simulation::path::{Ellipse, Path, Polyline};
use crate::simulation::states::{Body, Center, NVec3};

/// Helper to build `n` deterministic sources, no rand needed
fn make_sources(n: usize) -> Vec<Source> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let position = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            // alternate sinks and sources
            let strength = if i % 2 == 0 { 1.0 } else { -0.5 };
            Source::new(position, strength)
        })
        .collect()
}

fn make_grid() -> GridSpec {
    GridSpec {
        x_range: [-7.0, 7.0],
        y_range: [-4.0, 4.0],
        delta_x: 0.1,
        delta_y: 0.1,
        z: 0.0,
    }
}

/// Time a full arrow-grid evaluation for a range of source counts
pub fn bench_field() {
    let ns = [1, 2, 8, 32, 128, 512];
    let grid = make_grid();

    for n in ns {
        let field = match FieldSampler::new(make_sources(n), SamplerConfig::default()) {
            Ok(f) => f,
            Err(e) => {
                println!("sources = {n:4}: skipped ({e})");
                continue;
            }
        };

        // Warm up
        if let Err(e) = sample_grid(&field, &grid) {
            println!("sources = {n:4}: skipped ({e})");
            continue;
        }

        let t0 = Instant::now();
        let samples = match sample_grid(&field, &grid) {
            Ok(s) => s,
            Err(e) => {
                println!("sources = {n:4}: stopped ({e})");
                continue;
            }
        };
        let dt = t0.elapsed().as_secs_f64();

        println!(
            "sources = {n:4}, points = {:6}, grid = {:8.6} s, per point = {:8.3} us",
            samples.len(),
            dt,
            dt * 1e6 / samples.len().max(1) as f64
        );
    }
}

/// Paste output directly into a spreadsheet to graph
pub fn bench_field_curve() {
    println!("sources,us_per_eval");

    let grid = make_grid();
    if let Err(e) = grid.validate() {
        println!("skipped ({e})");
        return;
    }
    let queries = grid.points();
    for n in (8..=1024).step_by(8) {
        let field = match FieldSampler::new(make_sources(n), SamplerConfig::default()) {
            Ok(f) => f,
            Err(e) => {
                println!("{n},skipped ({e})");
                continue;
            }
        };

        let t0 = Instant::now();
        let mut acc = NVec3::zeros();
        for q in &queries {
            acc += field.evaluate(q);
        }
        let us = t0.elapsed().as_secs_f64() * 1e6 / queries.len() as f64;

        // keep `acc` alive so the loop is not optimized away
        println!("{},{:.6}{}", n, us, if acc.x.is_nan() { " (nan)" } else { "" });
    }
}

/// Time orbit ticks for the ellipse (analytic and finite difference) and a polyline path
pub fn bench_orbit() {
    let ticks = 100_000;
    let dt = 1.0 / 60.0;
    let center = Center::new(NVec3::new(3.0, 0.0, 0.0));

    let ellipse = match Ellipse::with_right_focus(center.x, 3.5, 2.0) {
        Ok(e) => e,
        Err(e) => {
            println!("ellipse: skipped ({e})");
            return;
        }
    };
    let ring: Vec<NVec3> = (0..64)
        .map(|i| {
            let a = i as f64 / 64.0 * std::f64::consts::TAU;
            NVec3::new(a.cos() * 3.0, a.sin() * 3.0, 0.0)
        })
        .collect();
    let polygon = match Polyline::new(ring) {
        Ok(p) => p,
        Err(e) => {
            println!("polyline: skipped ({e})");
            return;
        }
    };

    time_orbit("ellipse/finite_difference", &ellipse, SpeedProbe::default(), &center, ticks, dt);
    time_orbit("ellipse/analytic", &ellipse, SpeedProbe::Analytic, &center, ticks, dt);
    time_orbit("polyline/finite_difference", &polygon, SpeedProbe::default(), &Center::new(NVec3::zeros()), ticks, dt);
}

fn time_orbit<P: Path>(label: &str, path: P, probe: SpeedProbe, center: &Center, ticks: usize, dt: f64) {
    let orbit = Orbiting::new(path, 5.0).and_then(|o| o.with_probe(probe));
    let mut orbit = match orbit {
        Ok(o) => o,
        Err(e) => {
            println!("{label}: skipped ({e})");
            return;
        }
    };

    let mut body = Body::new(NVec3::zeros());
    orbit.place(&mut body);

    let t0 = Instant::now();
    for _ in 0..ticks {
        if let Err(e) = orbit.advance(dt, center, &mut body) {
            println!("{label}: stopped ({e})");
            return;
        }
    }
    let elapsed = t0.elapsed().as_secs_f64();

    println!(
        "{label:28} ticks = {ticks}, total = {:8.6} s, per tick = {:8.3} ns, final fraction = {:.4}",
        elapsed,
        elapsed * 1e9 / ticks as f64,
        orbit.fraction()
    );
}
