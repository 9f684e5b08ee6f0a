use emsim::{build_simulator, ScenarioConfig, StartSimulateOptions};

use anyhow::Result;
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "sample.json")]
    file_name: String,

    /// Use the analytic constant-field step instead of the naive one
    #[arg(long)]
    accurate: bool,
}

// load here to keep main clean
fn load_scenario_from_json(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_json::from_reader(reader)?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let scenario_cfg = load_scenario_from_json(&args.file_name)?;
    let mut simulator = build_simulator(scenario_cfg)?;

    simulator.start_simulate(StartSimulateOptions {
        accurate: args.accurate,
    })?;

    // Per-particle run report; rendering is an external concern
    for particle in simulator.get_particles() {
        let track = particle.track();
        let bounds = particle.track_bounding_box()?;
        let first = track.first().map(|p| p.time.to_f64()).unwrap_or(f64::NAN);
        let last = track.last().map(|p| p.time.to_f64()).unwrap_or(f64::NAN);
        println!(
            "{}: {} samples, t in [{:.4}, {:.4}], box left {:.4} right {:.4} bottom {:.4} top {:.4}",
            particle.id(),
            track.len(),
            first,
            last,
            bounds.left,
            bounds.right,
            bounds.bottom,
            bounds.top,
        );
    }

    Ok(())
}
