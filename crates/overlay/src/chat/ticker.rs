use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::chat::events::SessionEvent;
use crate::chat::message::RequestTarget;
use crate::chat::task::TaskHandle;

pub const DEFAULT_TICKER_INTERVAL_MS: u64 = 800;

pub const LOADING_MESSAGES: [&str; 14] = [
    "thinking...",
    "fetching account data",
    "let me check",
    "crunching the numbers",
    "putting it together",
    "just a moment",
    "reviewing your details",
    "checking latest info",
    "processing your request",
    "gathering insights now",
    "polishing the numbers",
    "retrieving your info",
    "geting things lined up",
    "retrieving secure records",
];

/// Cyclic placeholder shown while a prompt is pending.
///
/// The index lives here; the spawned job only emits ticks. Dropping the ticker
/// aborts the job.
pub struct LoadingTicker {
    target: RequestTarget,
    index: usize,
    _job: TaskHandle,
}

impl LoadingTicker {
    /// Shows the first placeholder immediately and schedules periodic ticks.
    /// A zero `interval` falls back to [`DEFAULT_TICKER_INTERVAL_MS`].
    pub fn start(
        target: RequestTarget,
        interval: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let interval = effective_interval(interval);
        let job = TaskHandle::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + interval, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(SessionEvent::LoadingTick(target)).is_err() {
                    break;
                }
            }
        });

        Self {
            target,
            index: 0,
            _job: job,
        }
    }

    pub fn target(&self) -> RequestTarget {
        self.target
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &'static str {
        LOADING_MESSAGES[self.index]
    }

    /// Moves to the next placeholder, wrapping after the last one.
    pub fn advance(&mut self) -> &'static str {
        self.index = next_index(self.index, LOADING_MESSAGES.len());
        self.text()
    }
}

// `interval_at` panics on a zero period.
fn effective_interval(interval: Duration) -> Duration {
    if interval.is_zero() {
        Duration::from_millis(DEFAULT_TICKER_INTERVAL_MS)
    } else {
        interval
    }
}

pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}
