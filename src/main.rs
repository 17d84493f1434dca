use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use annals::scenario::ScenarioLoader;

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn-based procedural history runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/two_valleys.yaml")]
    scenario: PathBuf,

    /// Override turn count (uses scenario default when omitted)
    #[arg(long)]
    turns: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final world snapshot as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let turns = scenario.turns(cli.turns);
    let mut engine = scenario.build_engine(cli.seed)?;
    info!(
        scenario = %scenario.name,
        turns,
        tiles = engine.world().tiles().len(),
        polities = engine.world().polities().count(),
        "starting run"
    );

    engine
        .run(turns)
        .with_context(|| format!("simulation '{}' aborted", scenario.name))?;

    let world = engine.world();
    if cli.json {
        let snapshot = serde_json::to_string_pretty(&engine.snapshot())?;
        println!("{snapshot}");
    } else {
        let sovereigns = world.polities().filter(|p| p.is_sovereign()).count();
        println!(
            "Scenario '{}' completed {} turns (year {}). Population: {}, sovereign polities: {}",
            scenario.name,
            turns,
            world.year(),
            world.total_population(),
            sovereigns
        );
    }
    Ok(())
}
