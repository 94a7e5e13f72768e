use crate::rt::Scheduler;
use crate::time::SimTime;
use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

/// A future that completes once the simulated clock reaches its deadline
///
/// The deadline is only handed to the scheduler on the first poll, so a timer that is never
/// awaited never moves the clock. The scheduler is only referenced weakly: parked tasks own their
/// timers, and the runtime must still be freed when its last [`crate::rt::Rt`] goes away.
pub struct Timer {
    scheduler: Weak<Scheduler>,
    deadline: SimTime,
    ticket: Option<u64>,
}

impl Timer {
    pub(crate) fn new(scheduler: &Arc<Scheduler>, deadline: SimTime) -> Self {
        Self {
            scheduler: Arc::downgrade(scheduler),
            deadline,
            ticket: None,
        }
    }

    pub fn deadline(&self) -> SimTime {
        self.deadline
    }

    /// Moves the deadline, keeping the waker of the task that awaits this timer
    pub fn reset(self: Pin<&mut Self>, deadline: SimTime) {
        let this = self.get_mut();
        this.deadline = deadline;
        let Some(scheduler) = this.scheduler.upgrade() else {
            return;
        };

        if let Some(ticket) = this.ticket.take() {
            let mut timers = scheduler.timers.lock();
            let waker = timers.cancel(ticket);
            this.ticket = Some(timers.schedule(deadline, waker));
        }
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(scheduler) = this.scheduler.upgrade() else {
            // The runtime is gone, so the clock will never move again
            return Poll::Pending;
        };

        if scheduler.now() >= this.deadline {
            return Poll::Ready(());
        }

        let waker = cx.waker().clone();
        let stale = match this.ticket {
            Some(ticket) => scheduler.timers.lock().set_waker(ticket, waker),
            None => {
                let ticket = scheduler.timers.lock().schedule(this.deadline, Some(waker));
                this.ticket = Some(ticket);
                None
            }
        };

        // Dropped only now that the timer queue is unlocked
        drop(stale);
        Poll::Pending
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let scheduler = self.scheduler.upgrade();
        if let (Some(scheduler), Some(ticket)) = (scheduler, self.ticket.take()) {
            let _waker = scheduler.timers.lock().cancel(ticket);
        }
    }
}

impl Debug for Timer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timer(deadline = {}s)", self.deadline)
    }
}
