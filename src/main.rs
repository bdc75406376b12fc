use orbitsim::{sample_grid, Scenario, ScenarioConfig};
use orbitsim::{bench_field, bench_field_curve, bench_orbit};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "planet_and_field.yaml")]
    file_name: String,

    /// Print the sampled field grid after the run
    #[arg(long)]
    grid: bool,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_field();
        bench_field_curve();
        bench_orbit();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("building scenario")?;

    // CSV trace: one row per body per traced step
    println!("step,t,body,fraction,x,y,z");
    let trace_every = scenario.parameters.trace_every;
    scenario.run(|n, s| {
        if n % trace_every != 0 {
            return;
        }
        for binding in &s.orbits {
            let x = s.system.bodies[binding.body].x;
            println!(
                "{},{:.6},{},{:.6},{:.6},{:.6},{:.6}",
                n,
                s.system.t,
                binding.name,
                binding.orbit.fraction(),
                x.x,
                x.y,
                x.z
            );
        }
    })?;
    info!("finished at t = {}", scenario.system.t);

    if args.grid {
        match (&scenario.field, &scenario.grid) {
            (Some(field), Some(grid)) => {
                println!("x,y,z,fx,fy,fz");
                for sample in sample_grid(field, grid)? {
                    let (p, v) = (sample.point, sample.vector);
                    println!("{:.4},{:.4},{:.4},{:.6},{:.6},{:.6}", p.x, p.y, p.z, v.x, v.y, v.z);
                }
            }
            _ => info!("--grid requested but the scenario has no field grid"),
        }
    }

    Ok(())
}
