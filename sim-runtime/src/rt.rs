use crate::time::SimTime;
use crate::time::queue::TimerQueue;
use crate::time::timer::Timer;
use futures::FutureExt;
use futures::channel::oneshot;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt::{Debug, Formatter};
use std::pin::{Pin, pin};
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll, Wake, Waker};
use std::time::Duration;

thread_local! {
    static CURRENT: RefCell<Option<Rt>> = const { RefCell::new(None) };
}

/// Handle to a simulated-time executor; clones drive the same scheduler
///
/// Tasks and timers only point back to the scheduler weakly, so once the last handle is dropped
/// every unfinished task is dropped too.
#[derive(Clone, Default)]
pub struct Rt {
    scheduler: Arc<Scheduler>,
}

type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Task {
    id: u64,
    future: BoxedTask,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    clock: Mutex<SimTime>,
    task_ids: AtomicU64,
    run_queue: Mutex<VecDeque<Task>>,
    parked: Mutex<HashMap<u64, Task>>,
    pub(crate) timers: Mutex<TimerQueue>,
}

impl Scheduler {
    pub(crate) fn now(&self) -> SimTime {
        *self.clock.lock()
    }

    fn enqueue(&self, task: Task) {
        self.run_queue.lock().push_back(task);
    }

    fn next_ready(&self) -> Option<Task> {
        self.run_queue.lock().pop_front()
    }

    fn park(&self, task: Task) {
        self.parked.lock().insert(task.id, task);
    }

    fn unpark(&self, task_id: u64) {
        let task = self.parked.lock().remove(&task_id);
        if let Some(task) = task {
            self.enqueue(task);
        }
    }
}

/// Marks the runtime as driving the current thread until dropped
struct CurrentGuard;

impl CurrentGuard {
    fn enter(rt: &Rt) -> Self {
        let previous = CURRENT.replace(Some(rt.clone()));
        if previous.is_some() {
            panic!("`Rt::block_on` cannot be nested");
        }

        CurrentGuard
    }
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        CURRENT.set(None);
    }
}

impl Rt {
    /// The runtime driving the current thread
    ///
    /// Panics outside of [`Rt::block_on`].
    pub fn active() -> Rt {
        match CURRENT.with_borrow(Option::clone) {
            Some(rt) => rt,
            None => panic!("no simulation runtime is driving the current thread"),
        }
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn spawn<T: Send + 'static>(
        &self,
        future: impl Future<Output = T> + Send + 'static,
    ) -> JoinHandle<T> {
        let (tx, rx) = oneshot::channel();
        let id = self.scheduler.task_ids.fetch_add(1, Ordering::Relaxed);
        self.scheduler.enqueue(Task {
            id,
            future: Box::pin(async move {
                // Nobody may be waiting for the output
                let _ = tx.send(future.await);
            }),
        });

        JoinHandle { output: rx }
    }

    #[must_use]
    pub fn sleep(&self, duration: Duration) -> Timer {
        self.sleep_until(self.now() + duration)
    }

    #[must_use]
    pub fn sleep_until(&self, deadline: SimTime) -> Timer {
        Timer::new(&self.scheduler, deadline)
    }

    /// Drives `main` and every spawned task until `main` completes
    ///
    /// Spawned tasks that are ready get polled before `main`, including after the clock jumps.
    /// Panics if `main` is pending while no task is ready and no timer is scheduled.
    pub fn block_on<T>(&self, main: impl Future<Output = T>) -> T {
        let _current = CurrentGuard::enter(self);
        let mut main = pin!(main);
        let mut cx = Context::from_waker(Waker::noop());

        loop {
            self.run_ready_tasks();
            if let Poll::Ready(output) = main.as_mut().poll(&mut cx) {
                return output;
            }

            if self.scheduler.run_queue.lock().is_empty() {
                self.advance_clock();
            }
        }
    }

    fn run_ready_tasks(&self) {
        while let Some(mut task) = self.scheduler.next_ready() {
            let notifier = Arc::new(TaskNotifier {
                task_id: task.id,
                scheduler: Arc::downgrade(&self.scheduler),
                notified: AtomicBool::new(false),
            });
            let waker = Waker::from(notifier.clone());

            match task.future.as_mut().poll(&mut Context::from_waker(&waker)) {
                Poll::Ready(()) => {}
                // Woken while being polled, so it is not in the parked set yet
                Poll::Pending if notifier.notified.load(Ordering::SeqCst) => {
                    self.scheduler.enqueue(task)
                }
                Poll::Pending => self.scheduler.park(task),
            }
        }
    }

    fn advance_clock(&self) {
        let due = self.scheduler.timers.lock().pop_earliest();
        let Some((deadline, wakers)) = due else {
            let parked = self.scheduler.parked.lock().len();
            panic!(
                "simulation is stuck at {}s: main is pending with {parked} parked tasks \
                 and no timers",
                self.now()
            );
        };

        {
            let mut clock = self.scheduler.clock.lock();
            *clock = (*clock).max(deadline);
        }

        for waker in wakers {
            waker.wake();
        }
    }
}

impl Debug for Rt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rt(now = {}s)", self.now())
    }
}

struct TaskNotifier {
    task_id: u64,
    scheduler: Weak<Scheduler>,
    notified: AtomicBool,
}

impl Wake for TaskNotifier {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.notified.store(true, Ordering::SeqCst);
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.unpark(self.task_id);
        }
    }
}

/// Resolves to the output of a spawned task, or an error if the task was dropped unfinished
pub struct JoinHandle<T> {
    output: oneshot::Receiver<T>,
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, oneshot::Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.output.poll_unpin(cx)
    }
}
