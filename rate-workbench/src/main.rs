use crate::config::SimulationConfig;
use crate::config::cli::{CliOpt, Command};
use crate::traffic::random::RandomTraffic;
use anyhow::Context as _;
use clap::Parser;
use sim_runtime::rt::Rt;
use tracing_subscriber::EnvFilter;

mod config;
mod simulation;
mod traffic;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, so a report written to stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = CliOpt::parse();
    let config = SimulationConfig::load(&options)?;

    let events = match &options.command {
        Command::Replay(replay) => {
            let traffic = config::read_json(&replay.traffic)?;
            config::traffic::into_scheduled(traffic, &config.topology)
                .context("invalid traffic file")?
        }
        Command::Random(random) => {
            let seed = if options.non_deterministic {
                fastrand::u64(..)
            } else {
                random.seed
            };
            tracing::info!(seed, "generating random traffic");
            RandomTraffic::from_opt(random, seed)?
                .generate(&config.topology, options.duration())
        }
    };

    let rt = Rt::default();
    rt.block_on(simulation::run(&options, config, events))
}
