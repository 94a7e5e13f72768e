use l3_rate_tracer::{Face, TrafficEvent};
use std::sync::Arc;
use std::time::Duration;

pub mod random;

/// A traffic notification to deliver to a node's tracer at a given simulated time
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub at: Duration,
    pub node: Arc<str>,
    pub face: Face,
    pub event: TrafficEvent,
    pub size_bytes: u64,
}
