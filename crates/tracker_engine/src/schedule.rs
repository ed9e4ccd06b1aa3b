use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracker_core::ItemId;
use tracker_logging::tracker_debug;

/// Default refresh period while a poll session is active.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Handle to a scheduled task. Its only capability is cancellation.
pub trait TaskHandle: Send {
    /// Stops the task. No invocation starts after this returns.
    fn cancel(&self);
}

/// Runs a task repeatedly at a fixed period.
pub trait Scheduler {
    fn schedule_repeating(
        &self,
        interval: Duration,
        task: Box<dyn FnMut() + Send + 'static>,
    ) -> Box<dyn TaskHandle>;
}

/// Scheduler backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }
}

struct TokioTaskHandle {
    token: CancellationToken,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&self) {
        self.token.cancel();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        interval: Duration,
        mut task: Box<dyn FnMut() + Send + 'static>,
    ) -> Box<dyn TaskHandle> {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        self.runtime.spawn(async move {
            // First run happens one period after scheduling, not immediately.
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => task(),
                }
            }
        });
        Box::new(TokioTaskHandle { token })
    }
}

/// Owns the repeating refresh timer of one poll session.
pub struct PollController<S: Scheduler> {
    scheduler: S,
    interval: Duration,
    running: Option<(ItemId, Box<dyn TaskHandle>)>,
}

impl<S: Scheduler> PollController<S> {
    pub fn new(scheduler: S, interval: Duration) -> Self {
        Self {
            scheduler,
            interval,
            running: None,
        }
    }

    /// Starts refreshing `item_id`, calling `on_tick` every interval.
    /// Returns `false` without scheduling anything if a session is running.
    pub fn start(
        &mut self,
        item_id: ItemId,
        mut on_tick: impl FnMut(ItemId) + Send + 'static,
    ) -> bool {
        if self.running.is_some() {
            tracker_debug!("Poll session already running; ignoring start for {}", item_id);
            return false;
        }
        let handle = self
            .scheduler
            .schedule_repeating(self.interval, Box::new(move || on_tick(item_id)));
        self.running = Some((item_id, handle));
        tracker_debug!("Poll session started for {} every {:?}", item_id, self.interval);
        true
    }

    /// Cancels the timer. Returns `true` if a session was running.
    pub fn stop(&mut self) -> bool {
        match self.running.take() {
            Some((item_id, handle)) => {
                handle.cancel();
                tracker_debug!("Poll session stopped for {}", item_id);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.running.as_ref().map(|(item_id, _)| *item_id)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<S: Scheduler> Drop for PollController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
