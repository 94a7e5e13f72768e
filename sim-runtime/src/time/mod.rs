use crate::rt::Rt;
pub use crate::time::instant::SimTime;
use crate::time::timer::Timer;
use std::time::Duration;

mod instant;
pub(crate) mod queue;
pub mod timer;

#[must_use]
pub fn sleep(duration: Duration) -> Timer {
    Rt::active().sleep(duration)
}

/// Completes once the clock reads `deadline`; immediately if it already does
#[must_use]
pub fn sleep_until(deadline: SimTime) -> Timer {
    Rt::active().sleep_until(deadline)
}
