//! Per-face traffic rate tracing for simulated forwarding nodes
//!
//! A [`RateTracer`] is attached to a node and fed every packet-level event the node's forwarding
//! engine observes (Interests, Nacks and Data sent, received or dropped, plus Interest
//! completions). It keeps one set of counters per face and, once per averaging period, converts
//! them into rates, writes one report row per face and category, and starts counting from zero.
//!
//! Tracers are usually created through the installer functions, which open a single
//! [`OutputStream`] and share it among all the tracers they create.

pub mod error;
pub mod event;
pub mod output;
pub mod stats;
pub mod topology;
pub mod tracer;

pub use error::{TopologyError, TracerError};
pub use event::{Category, TrafficEvent, TrafficSink};
pub use output::{Destination, OutputStream};
pub use topology::{Face, FaceId, Node, Topology};
pub use tracer::installer::{
    TracerBundle, install, install_all, install_node, install_with_stream,
};
pub use tracer::period::{AveragingPeriod, DEFAULT_AVERAGING_PERIOD};
pub use tracer::rate_tracer::RateTracer;
pub use tracer::report::ReportRow;
