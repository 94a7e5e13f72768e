use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
pub struct CliOpt {
    /// Path to the JSON file containing the nodes and their faces
    #[arg(long)]
    pub topology: PathBuf,

    /// Where the rate report is written; `-` means standard output
    #[arg(long, default_value = "-")]
    pub output: String,

    /// The averaging period, i.e. how often counters are turned into rates and reset
    #[arg(long, default_value_t = 500)]
    pub averaging_period_ms: u64,

    /// Name of a node that should be traced (may be repeated; all nodes are traced by default)
    #[arg(long = "node")]
    pub nodes: Vec<String>,

    /// How long the simulation runs, in simulated time
    #[arg(long)]
    pub duration_ms: u64,

    /// Whether the run should use a non-constant seed for generated traffic
    #[arg(long)]
    pub non_deterministic: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliOpt {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn averaging_period(&self) -> Duration {
        Duration::from_millis(self.averaging_period_ms)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replay the traffic events listed in a JSON file
    Replay(ReplayOpt),
    /// Generate random Interest/Data exchanges on every face
    Random(RandomOpt),
}

#[derive(Parser, Debug, Clone)]
pub struct ReplayOpt {
    /// Path to the JSON file containing the traffic events
    #[arg(long)]
    pub traffic: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct RandomOpt {
    /// The random seed used to generate traffic
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Interest exchanges started per second, on each face
    #[arg(long, default_value_t = 10.0)]
    pub exchanges_per_second: f64,

    /// The ratio of incoming Interests answered from the content store
    #[arg(long, default_value_t = 0.3)]
    pub cache_hit_ratio: f64,

    /// The ratio of Interests that are dropped (the value must be between 0 and 1)
    #[arg(long, default_value_t = 0.01)]
    pub drop_ratio: f64,

    /// The ratio of Interests answered with a Nack (the value must be between 0 and 1)
    #[arg(long, default_value_t = 0.05)]
    pub nack_ratio: f64,

    /// The ratio of outgoing Interests that time out (the value must be between 0 and 1)
    #[arg(long, default_value_t = 0.02)]
    pub timeout_ratio: f64,
}
