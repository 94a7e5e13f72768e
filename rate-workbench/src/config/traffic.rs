use crate::traffic::ScheduledEvent;
use anyhow::Context as _;
use l3_rate_tracer::{FaceId, Topology, TrafficEvent};
use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct TrafficEventJson {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "time_ms")]
    time: Duration,
    node: String,
    face: u32,
    event: TrafficKindJson,
    #[serde(default)]
    size_bytes: u64,
    /// Only meaningful for `outData`
    #[serde(default)]
    from_cache: bool,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
enum TrafficKindJson {
    OutInterest,
    InInterest,
    DropInterest,
    OutNack,
    InNack,
    DropNack,
    OutData,
    InData,
    DropData,
    SatisfiedInterest,
    TimedOutInterest,
}

impl TrafficEventJson {
    fn event(&self) -> TrafficEvent {
        match self.event {
            TrafficKindJson::OutInterest => TrafficEvent::OutInterest,
            TrafficKindJson::InInterest => TrafficEvent::InInterest,
            TrafficKindJson::DropInterest => TrafficEvent::DropInterest,
            TrafficKindJson::OutNack => TrafficEvent::OutNack,
            TrafficKindJson::InNack => TrafficEvent::InNack,
            TrafficKindJson::DropNack => TrafficEvent::DropNack,
            TrafficKindJson::OutData => TrafficEvent::OutData {
                from_cache: self.from_cache,
            },
            TrafficKindJson::InData => TrafficEvent::InData,
            TrafficKindJson::DropData => TrafficEvent::DropData,
            TrafficKindJson::SatisfiedInterest => TrafficEvent::SatisfiedInterest,
            TrafficKindJson::TimedOutInterest => TrafficEvent::TimedOutInterest,
        }
    }
}

/// Resolves node names and face ids against the topology, ordering the events by time
pub fn into_scheduled(
    events: Vec<TrafficEventJson>,
    topology: &Topology,
) -> anyhow::Result<Vec<ScheduledEvent>> {
    let mut scheduled = Vec::with_capacity(events.len());
    for (index, json) in events.into_iter().enumerate() {
        let node = topology
            .node(&json.node)
            .with_context(|| format!("event {index} refers to unknown node `{}`", json.node))?;
        let face = node.face(FaceId(json.face)).with_context(|| {
            format!(
                "event {index} refers to unknown face {} of node `{}`",
                json.face, json.node
            )
        })?;

        scheduled.push(ScheduledEvent {
            at: json.time,
            node: node.name().clone(),
            face: face.clone(),
            event: json.event(),
            size_bytes: json.size_bytes,
        });
    }

    // Stable, so events at the same instant keep their file order
    scheduled.sort_by_key(|e| e.at);
    Ok(scheduled)
}
