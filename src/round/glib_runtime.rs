use std::rc::Rc;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use glib::{ControlFlow, MainContext, SourceId};

use super::engine::Round;
use super::services::{Completion, Scheduler};

pub const CLOCK_INTERVAL_MS: u64 = 100;

#[derive(Clone, Debug)]
pub struct GlibScheduler {
    context: MainContext,
}

impl Default for GlibScheduler {
    fn default() -> Self {
        GlibScheduler {
            context: MainContext::default(),
        }
    }
}

impl GlibScheduler {
    pub fn new(context: MainContext) -> Self {
        GlibScheduler { context }
    }
}

impl Scheduler for GlibScheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.context.spawn_local(task);
    }

    fn sleep(&self, seconds: f64) -> Completion {
        let duration = Duration::from_secs_f64(seconds.max(0.0));
        glib::timeout_future(duration).boxed_local()
    }
}

/// Ticks the round clock from the main loop using measured wall time. Keep
/// the returned id and `remove()` it when the round's view goes away.
pub fn drive_clock(round: Rc<Round>) -> SourceId {
    let mut last = glib::monotonic_time();
    glib::timeout_add_local(Duration::from_millis(CLOCK_INTERVAL_MS), move || {
        let now = glib::monotonic_time();
        let dt = (now - last) as f64 / 1_000_000.0;
        last = now;
        round.tick(dt);
        ControlFlow::Continue
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn sleep_resolves_on_the_main_context() {
        let context = MainContext::new();
        let scheduler = GlibScheduler::new(context.clone());
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        context.block_on(async move {
            scheduler.sleep(0.01).await;
            flag.set(true);
        });
        assert!(done.get());
    }
}
