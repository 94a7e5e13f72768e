//! Deterministic, single-threaded executor driven by a simulated clock
//!
//! Time only moves forward when every task is blocked, at which point the clock jumps straight to
//! the earliest pending timer. A simulation of several seconds therefore runs as fast as the CPU
//! allows, and two runs with the same inputs observe exactly the same interleaving.

pub use sim_runtime_macros::test;

#[cfg(test)]
use sim_runtime_macros::test_priv;

pub mod cancellation;
pub mod rt;
pub mod time;

/// Spawns a task on the runtime that is active in the current thread
///
/// Panics when called outside of [`rt::Rt::block_on`].
pub fn spawn<T: Send + 'static>(f: impl Future<Output = T> + Send + 'static) -> rt::JoinHandle<T> {
    rt::Rt::active().spawn(f)
}
