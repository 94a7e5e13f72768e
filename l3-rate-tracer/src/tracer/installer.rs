//! Attaches rate tracers to nodes, sharing a single output destination per installation

use crate::error::TracerError;
use crate::output::{Destination, OutputStream};
use crate::topology::{Node, Topology};
use crate::tracer::period::AveragingPeriod;
use crate::tracer::rate_tracer::RateTracer;
use std::sync::Arc;
use std::time::Duration;

/// The tracers created by one installation, together with the stream they write to
pub struct TracerBundle {
    stream: OutputStream,
    tracers: Vec<Arc<RateTracer>>,
}

impl TracerBundle {
    pub fn stream(&self) -> &OutputStream {
        &self.stream
    }

    pub fn tracers(&self) -> &[Arc<RateTracer>] {
        &self.tracers
    }

    pub fn tracer(&self, node_name: &str) -> Option<&Arc<RateTracer>> {
        self.tracers
            .iter()
            .find(|t| &**t.node().name() == node_name)
    }

    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    pub fn into_tracers(self) -> Vec<Arc<RateTracer>> {
        self.tracers
    }
}

/// Installs a tracer on every node of the topology
pub fn install_all(
    topology: &Topology,
    destination: &Destination,
    period: Duration,
) -> Result<TracerBundle, TracerError> {
    install(topology.nodes(), destination, period)
}

/// Installs a tracer on each of the given nodes, all of them writing to `destination`
///
/// The destination is opened even if there are no nodes, but the header is only written when at
/// least one tracer is created.
pub fn install<'a>(
    nodes: impl IntoIterator<Item = &'a Arc<Node>>,
    destination: &Destination,
    period: Duration,
) -> Result<TracerBundle, TracerError> {
    AveragingPeriod::new(period)?;
    let nodes: Vec<_> = nodes.into_iter().cloned().collect();
    let stream = OutputStream::open(destination)?;

    let mut tracers = Vec::with_capacity(nodes.len());
    for node in &nodes {
        tracers.push(install_with_stream(node, &stream, period)?);
    }

    tracing::info!(
        destination = %destination,
        tracers = tracers.len(),
        "rate tracers installed"
    );
    Ok(TracerBundle { stream, tracers })
}

/// Installs a tracer on a single node, writing to its own stream
pub fn install_node(
    node: &Arc<Node>,
    destination: &Destination,
    period: Duration,
) -> Result<Arc<RateTracer>, TracerError> {
    AveragingPeriod::new(period)?;
    let stream = OutputStream::open(destination)?;
    install_with_stream(node, &stream, period)
}

/// Installs a tracer on a single node, writing to an already open stream
pub fn install_with_stream(
    node: &Arc<Node>,
    stream: &OutputStream,
    period: Duration,
) -> Result<Arc<RateTracer>, TracerError> {
    let tracer = RateTracer::new(node.clone(), stream.clone(), period)?;
    tracer.print_header()?;
    Ok(Arc::new(tracer))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{Category, TrafficEvent, TrafficSink};
    use crate::output::test_util::memory_stream;
    use crate::stats::PacketStats;
    use crate::topology::spec::{FaceSpec, NodeSpec, TopologySpec};
    use crate::topology::{Face, FaceId};
    use bon::builder;
    use sim_runtime::time::sleep;
    use std::path::PathBuf;

    #[builder]
    fn test_topology(node_names: Vec<&'static str>, faces_per_node: Option<u32>) -> Topology {
        let faces_per_node = faces_per_node.unwrap_or(1);
        let nodes = node_names
            .into_iter()
            .map(|name| NodeSpec {
                name: name.to_string(),
                faces: (1..=faces_per_node)
                    .map(|id| FaceSpec {
                        id,
                        description: format!("netdev://{name}/{id}"),
                    })
                    .collect(),
            })
            .collect();

        Topology::from_spec(TopologySpec { nodes }).unwrap()
    }

    fn temp_path(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "l3-rate-tracer-{test_name}-{}.txt",
            std::process::id()
        ))
    }

    fn header_count(contents: &str) -> usize {
        contents.lines().filter(|l| l.starts_with("Time\t")).count()
    }

    #[sim_runtime::test]
    async fn test_install_all_shares_one_stream() {
        let topology = test_topology()
            .node_names(vec!["a", "b", "c"])
            .faces_per_node(2)
            .call();
        let path = temp_path("install-all");

        let bundle = install_all(
            &topology,
            &Destination::File(path.clone()),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(bundle.len(), 3);
        assert!(bundle.tracers().iter().all(|t| t.stream().ptr_eq(bundle.stream())));
        assert!(bundle.tracers().iter().all(|t| t.is_running()));
        assert_eq!(&**bundle.tracer("b").unwrap().node().name(), "b");

        let face = Face::new(FaceId(1), "netdev://a/1");
        bundle
            .tracer("a")
            .unwrap()
            .on_traffic(&face, TrafficEvent::OutInterest, 40);
        sleep(Duration::from_secs(1)).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(header_count(&contents), 1);
        // Only node `a` saw traffic, so only its face is reported
        assert_eq!(contents.lines().count(), 1 + Category::ALL.len());
        assert!(
            contents
                .lines()
                .skip(1)
                .all(|l| l.starts_with("1\ta\t1\tnetdev://a/1\t"))
        );

        drop(bundle);
        std::fs::remove_file(path).ok();
    }

    #[sim_runtime::test]
    async fn test_tracers_are_independent() {
        let topology = test_topology().node_names(vec!["x", "y"]).call();
        let (stream, buffer) = memory_stream();
        let tracers: Vec<_> = topology
            .nodes()
            .iter()
            .map(|node| install_with_stream(node, &stream, Duration::from_secs(1)).unwrap())
            .collect();

        let face = Face::new(FaceId(1), "netdev://x/1");
        tracers[0].on_traffic(&face, TrafficEvent::InData, 500);

        assert_eq!(
            tracers[0].stats_snapshot()[Category::InData as usize].stats,
            PacketStats {
                packets: 1,
                bytes: 500
            }
        );
        assert!(tracers[1].stats_snapshot().is_empty());
        assert_eq!(header_count(&buffer.contents()), 1);
    }

    #[sim_runtime::test]
    async fn test_install_without_nodes() {
        let path = temp_path("no-nodes");
        let bundle = install(
            std::iter::empty(),
            &Destination::File(path.clone()),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(bundle.is_empty());
        assert!(!bundle.stream().header_written());
        drop(bundle);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        std::fs::remove_file(path).ok();
    }

    #[sim_runtime::test]
    async fn test_install_fails_on_unopenable_destination() {
        let topology = test_topology().node_names(vec!["a"]).call();
        let path = temp_path("missing-dir").join("trace.txt");

        let result = install_all(
            &topology,
            &Destination::File(path.clone()),
            Duration::from_secs(1),
        );
        assert!(matches!(
            result,
            Err(TracerError::DestinationOpenFailure { path: failed, .. }) if failed == path
        ));

        let result = install_node(
            &topology.nodes()[0],
            &Destination::File(path),
            Duration::from_secs(1),
        );
        assert!(matches!(
            result,
            Err(TracerError::DestinationOpenFailure { .. })
        ));
    }

    #[sim_runtime::test]
    async fn test_install_rejects_zero_period_before_opening() {
        let topology = test_topology().node_names(vec!["a"]).call();
        let path = temp_path("zero-period");

        let result = install_all(&topology, &Destination::File(path.clone()), Duration::ZERO);
        assert!(matches!(result, Err(TracerError::InvalidArgument(_))));
        assert!(!path.exists());
    }

    #[sim_runtime::test]
    async fn test_install_node_writes_own_header() {
        let topology = test_topology().node_names(vec!["solo"]).call();
        let path = temp_path("install-node");

        let tracer = install_node(
            &topology.nodes()[0],
            &Destination::File(path.clone()),
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(tracer.averaging_period().as_secs_f64(), 0.5);
        assert_eq!(tracer.stream().handle_count(), 1);
        drop(tracer);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(header_count(&contents), 1);
        std::fs::remove_file(path).ok();
    }
}
