//! One-shot cancellation for long-running simulation tasks

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{Shared, pending};

/// Observes whether the paired [`CancellationSignal`] has fired
#[derive(Clone)]
pub struct CancellationToken {
    fired: Shared<oneshot::Receiver<()>>,
}

/// Requests cancellation; consumed on use, so a signal fires at most once
pub struct CancellationSignal {
    trigger: oneshot::Sender<()>,
}

impl CancellationToken {
    pub fn new() -> (Self, CancellationSignal) {
        let (trigger, fired) = oneshot::channel();
        let token = Self {
            fired: fired.shared(),
        };

        (token, CancellationSignal { trigger })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.fired.clone().now_or_never(), Some(Ok(())))
    }

    /// Completes once cancellation is requested
    ///
    /// Never completes if the signal is dropped without firing.
    pub async fn cancelled(&self) {
        match self.fired.clone().await {
            Ok(()) => {}
            Err(oneshot::Canceled) => pending().await,
        }
    }
}

impl CancellationSignal {
    pub fn cancel(self) {
        // Every token may be gone already
        let _ = self.trigger.send(());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spawn;
    use crate::time::{SimTime, sleep, sleep_until};
    use futures::select_biased;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    #[crate::test_priv]
    async fn test_waiting_task_resumes_on_cancel() {
        let (token, signal) = CancellationToken::new();
        let waiter = spawn(async move {
            token.cancelled().await;
            (SimTime::now().since_start(), token.is_cancelled())
        });

        sleep(Duration::from_millis(2250)).await;
        signal.cancel();

        let (resumed_at, observed) = waiter.await.unwrap();
        assert_eq!(resumed_at, Duration::from_millis(2250));
        assert!(observed);
    }

    #[crate::test_priv]
    async fn test_every_clone_observes_cancel() {
        let (token, signal) = CancellationToken::new();
        let clones: Vec<_> = (0..3).map(|_| token.clone()).collect();
        assert!(clones.iter().all(|t| !t.is_cancelled()));

        signal.cancel();
        assert!(clones.iter().all(CancellationToken::is_cancelled));
        clones[1].cancelled().await;
    }

    #[crate::test_priv]
    async fn test_cancel_interrupts_periodic_work() {
        let (token, signal) = CancellationToken::new();
        let rounds = Arc::new(AtomicU32::new(0));

        let counter = rounds.clone();
        let worker = spawn(async move {
            let mut next = SimTime::now();
            loop {
                next += Duration::from_millis(400);
                select_biased! {
                    _ = token.cancelled().fuse() => return SimTime::now(),
                    _ = sleep_until(next).fuse() => {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });

        sleep(Duration::from_millis(1000)).await;
        signal.cancel();

        let stopped_at = worker.await.unwrap();
        assert_eq!(stopped_at.since_start(), Duration::from_millis(1000));
        assert_eq!(rounds.load(Ordering::SeqCst), 2);
    }

    #[crate::test_priv]
    async fn test_dropping_signal_leaves_token_pending() {
        let (token, signal) = CancellationToken::new();
        let resumed = Arc::new(AtomicBool::new(false));

        let flag = resumed.clone();
        let waiting = token.clone();
        spawn(async move {
            waiting.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });

        drop(signal);
        sleep(Duration::from_secs(30)).await;

        assert!(!resumed.load(Ordering::SeqCst));
        assert!(!token.is_cancelled());
    }
}
