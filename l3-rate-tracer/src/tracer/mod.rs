pub mod installer;
pub mod period;
pub mod rate_tracer;
pub mod report;
