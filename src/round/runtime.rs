use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use tracing::error;

use super::services::{Completion, Scheduler};

/// Slack for float deadlines that should land exactly on a step boundary.
const DEADLINE_EPSILON: f64 = 1e-9;

struct Timer {
    deadline: f64,
    seq: u64,
    wake: oneshot::Sender<()>,
}

struct SchedulerInner {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<f64>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
}

#[derive(Clone)]
pub struct ManualScheduler {
    inner: Rc<SchedulerInner>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        ManualScheduler {
            inner: Rc::new(SchedulerInner {
                pool: RefCell::new(pool),
                spawner,
                now: Cell::new(0.0),
                next_seq: Cell::new(0),
                timers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn now(&self) -> f64 {
        self.inner.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    pub fn run_until_stalled(&self) {
        self.inner.pool.borrow_mut().run_until_stalled();
    }

    /// Moves virtual time forward by `dt`, firing timers in deadline order
    /// and letting woken tasks run before the next timer is considered.
    pub fn advance(&self, dt: f64) {
        let target = self.now() + dt.max(0.0);
        self.run_until_stalled();
        while let Some(deadline) = self.next_deadline(target) {
            if deadline > self.now() {
                self.inner.now.set(deadline);
            }
            self.fire_due();
            self.run_until_stalled();
        }
        self.inner.now.set(target);
        self.run_until_stalled();
    }

    fn next_deadline(&self, target: f64) -> Option<f64> {
        self.inner
            .timers
            .borrow()
            .iter()
            .map(|timer| timer.deadline)
            .filter(|deadline| *deadline <= target + DEADLINE_EPSILON)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn fire_due(&self) {
        let now = self.now();
        let mut due = {
            let mut timers = self.inner.timers.borrow_mut();
            let (due, rest): (Vec<Timer>, Vec<Timer>) = timers
                .drain(..)
                .partition(|timer| timer.deadline <= now + DEADLINE_EPSILON);
            *timers = rest;
            due
        };
        due.sort_by_key(|timer| timer.seq);
        for timer in due {
            let _ = timer.wake.send(());
        }
    }
}

impl Scheduler for ManualScheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.inner.spawner.spawn_local(task) {
            error!(error = %err, "scheduler refused a task");
        }
    }

    /// Zero or negative delays complete without waiting for `advance`.
    fn sleep(&self, seconds: f64) -> Completion {
        if seconds <= 0.0 || seconds.is_nan() {
            return future::ready(()).boxed_local();
        }
        let (wake, done) = oneshot::channel();
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq.wrapping_add(1));
        self.inner.timers.borrow_mut().push(Timer {
            deadline: self.now() + seconds,
            seq,
            wake,
        });
        async move {
            let _ = done.await;
        }
        .boxed_local()
    }
}
