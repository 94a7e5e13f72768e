use crate::config::cli::CliOpt;
use crate::config::topology::TopologyJson;
use anyhow::Context as _;
use l3_rate_tracer::Topology;
use serde::de::DeserializeOwned;
use std::path::Path;

pub mod cli;
pub mod topology;
pub mod traffic;

pub struct SimulationConfig {
    pub topology: Topology,
}

impl SimulationConfig {
    pub fn load(options: &CliOpt) -> anyhow::Result<Self> {
        let topology: TopologyJson = read_json(&options.topology)?;
        let topology = Topology::from_spec(topology.into()).with_context(|| {
            format!("invalid topology in `{}`", options.topology.display())
        })?;

        Ok(Self { topology })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse `{}`", path.display()))
}
