use crate::config::SimulationConfig;
use crate::config::cli::CliOpt;
use crate::traffic::ScheduledEvent;
use anyhow::Context as _;
use l3_rate_tracer::{Destination, TracerBundle, TrafficSink, install, install_all};
use sim_runtime::time::{SimTime, sleep, sleep_until};

/// Installs the tracers, delivers every event at its scheduled time and lets the simulation run
/// for the configured duration
pub async fn run(
    options: &CliOpt,
    config: SimulationConfig,
    events: Vec<ScheduledEvent>,
) -> anyhow::Result<()> {
    let destination = Destination::parse(&options.output);
    let bundle = install_tracers(options, &config, &destination)?;
    tracing::info!(
        destination = %destination,
        tracers = bundle.len(),
        events = events.len(),
        period_ms = options.averaging_period_ms,
        duration_ms = options.duration_ms,
        "starting simulation"
    );

    let mut skipped = 0;
    for scheduled in events {
        let Some(tracer) = bundle.tracer(&scheduled.node) else {
            skipped += 1;
            continue;
        };

        let tracer = tracer.clone();
        sim_runtime::spawn(async move {
            sleep_until(SimTime::from_duration(scheduled.at)).await;
            tracer.on_traffic(&scheduled.face, scheduled.event, scheduled.size_bytes);
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "ignored events of nodes without a tracer");
    }

    sleep(options.duration()).await;

    // Flushing here reports write errors; the drop-time flush can only log them
    bundle
        .stream()
        .flush()
        .context("failed to flush the rate report")?;
    for tracer in bundle.tracers() {
        tracer.stop();
    }

    tracing::info!(now = %SimTime::now(), "simulation finished");
    Ok(())
}

fn install_tracers(
    options: &CliOpt,
    config: &SimulationConfig,
    destination: &Destination,
) -> anyhow::Result<TracerBundle> {
    let period = options.averaging_period();
    if options.nodes.is_empty() {
        return install_all(&config.topology, destination, period)
            .context("failed to install rate tracers");
    }

    let mut nodes = Vec::with_capacity(options.nodes.len());
    for name in &options.nodes {
        let node = config
            .topology
            .node(name)
            .with_context(|| format!("cannot trace unknown node `{name}`"))?;
        nodes.push(node);
    }

    install(nodes, destination, period).context("failed to install rate tracers")
}
