use crate::time::SimTime;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::task::Waker;

/// Deadlines waiting for the simulated clock, each identified by a ticket
///
/// Tickets grow monotonically, so deadlines that coincide are released in the order they were
/// scheduled. Cancelling a ticket only forgets it; its heap slot is discarded once it surfaces.
#[derive(Default)]
pub(crate) struct TimerQueue {
    next_ticket: u64,
    deadlines: BinaryHeap<Reverse<(SimTime, u64)>>,
    live: HashMap<u64, Option<Waker>>,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, deadline: SimTime, waker: Option<Waker>) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.deadlines.push(Reverse((deadline, ticket)));
        self.live.insert(ticket, waker);
        ticket
    }

    /// Stores the waker to notify for `ticket`, handing back whichever waker is no longer needed
    pub(crate) fn set_waker(&mut self, ticket: u64, waker: Waker) -> Option<Waker> {
        match self.live.get_mut(&ticket) {
            Some(slot) => slot.replace(waker),
            None => Some(waker),
        }
    }

    pub(crate) fn cancel(&mut self, ticket: u64) -> Option<Waker> {
        self.live.remove(&ticket).flatten()
    }

    /// Releases every live deadline equal to the earliest one
    ///
    /// Returns that instant together with the wakers to notify, or `None` if nothing is pending.
    pub(crate) fn pop_earliest(&mut self) -> Option<(SimTime, Vec<Waker>)> {
        while let Some(&Reverse((_, ticket))) = self.deadlines.peek() {
            if self.live.contains_key(&ticket) {
                break;
            }
            self.deadlines.pop();
        }

        let &Reverse((earliest, _)) = self.deadlines.peek()?;
        let mut wakers = Vec::new();
        while let Some(&Reverse((deadline, ticket))) = self.deadlines.peek() {
            if deadline != earliest {
                break;
            }

            self.deadlines.pop();
            if let Some(waker) = self.live.remove(&ticket).flatten() {
                wakers.push(waker);
            }
        }

        Some((earliest, wakers))
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Wake;
    use std::time::Duration;

    /// Wakes by appending its label to a shared log
    struct Labelled(usize, Arc<parking_lot::Mutex<Vec<usize>>>);

    impl Wake for Labelled {
        fn wake(self: Arc<Self>) {
            self.1.lock().push(self.0);
        }
    }

    fn at(millis: u64) -> SimTime {
        SimTime::from_duration(Duration::from_millis(millis))
    }

    #[test]
    fn test_earliest_deadline_released_in_schedule_order() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let waker = |label| Some(Waker::from(Arc::new(Labelled(label, log.clone()))));

        let mut queue = TimerQueue::default();
        queue.schedule(at(200), waker(1));
        queue.schedule(at(100), waker(2));
        queue.schedule(at(200), waker(3));
        queue.schedule(at(100), waker(4));

        let (instant, wakers) = queue.pop_earliest().unwrap();
        assert_eq!(instant, at(100));
        wakers.into_iter().for_each(Waker::wake);
        assert_eq!(*log.lock(), vec![2, 4]);

        let (instant, wakers) = queue.pop_earliest().unwrap();
        assert_eq!(instant, at(200));
        wakers.into_iter().for_each(Waker::wake);
        assert_eq!(*log.lock(), vec![2, 4, 1, 3]);

        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn test_cancelled_deadlines_are_skipped() {
        let mut queue = TimerQueue::default();
        let early = queue.schedule(at(10), None);
        queue.schedule(at(50), None);

        assert!(queue.cancel(early).is_none());
        assert_eq!(queue.len(), 1);

        let (instant, wakers) = queue.pop_earliest().unwrap();
        assert_eq!(instant, at(50));
        assert!(wakers.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_set_waker_returns_stale_waker() {
        struct Counter(AtomicUsize);
        impl Wake for Counter {
            fn wake(self: Arc<Self>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let mut queue = TimerQueue::default();
        let ticket = queue.schedule(at(1), None);

        assert!(queue.set_waker(ticket, Waker::from(counter.clone())).is_none());
        assert!(queue.set_waker(ticket, Waker::from(counter.clone())).is_some());

        queue.cancel(ticket);
        assert!(queue.set_waker(ticket, Waker::from(counter.clone())).is_some());
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
