use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use super::clock::SharedClock;

/// Delay used instead of a non-positive one when a tick overran its slot.
pub const MIN_TIMER_DELAY: Duration = Duration::from_millis(1);

/// Shared stop flag for an [`IntervalTimer`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Periodic scheduler whose targets are anchored to the start time.
///
/// Tick `n` is due at `start + n * interval`, so a slow callback delays the
/// next tick once but never shifts the ones after it.
pub struct IntervalTimer {
    clock: SharedClock,
    interval: Duration,
    started_at: Option<Duration>,
    next_deadline: Option<Duration>,
    tick_id: u64,
    overruns: u64,
    cancel: CancelToken,
}

impl IntervalTimer {
    pub fn new(interval: Duration, clock: SharedClock) -> Self {
        Self {
            clock,
            interval,
            started_at: None,
            next_deadline: None,
            tick_id: 0,
            overruns: 0,
            cancel: CancelToken::default(),
        }
    }

    pub fn from_rate(rate: u32, clock: SharedClock) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / rate.max(1) as f64), clock)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Anchors the schedule at the current time. The first tick is due
    /// immediately. Starting twice, or after a stop, does nothing.
    pub fn start(&mut self) {
        if self.started_at.is_some() || self.cancel.is_cancelled() {
            return;
        }
        let now = self.clock.now();
        self.started_at = Some(now);
        self.next_deadline = Some(now);
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.next_deadline = None;
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.cancel.is_cancelled()
    }

    /// Ticks completed so far.
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        if self.cancel.is_cancelled() {
            None
        } else {
            self.next_deadline
        }
    }

    pub fn is_due(&self) -> bool {
        self.next_deadline()
            .is_some_and(|deadline| self.clock.now() >= deadline)
    }

    /// Runs at most one due tick and schedules the next one.
    ///
    /// Returns the id of the tick that ran, or `None` when nothing was due.
    pub fn run_due<E>(
        &mut self,
        mut callback: impl FnMut(u64) -> Result<(), E>,
    ) -> Result<Option<u64>, E> {
        if !self.is_due() {
            return Ok(None);
        }

        let tick_id = self.tick_id;
        callback(tick_id)?;
        self.tick_id += 1;

        if self.cancel.is_cancelled() {
            self.next_deadline = None;
            return Ok(Some(tick_id));
        }

        let Some(started_at) = self.started_at else {
            return Ok(Some(tick_id));
        };

        let target = started_at + self.interval.mul_f64(self.tick_id as f64);
        let now = self.clock.now();
        self.next_deadline = if target > now {
            Some(target)
        } else {
            self.overruns += 1;
            log::warn!(
                "interval timer overrun at tick {}: behind by {:?}",
                self.tick_id,
                now - target
            );
            Some(now + MIN_TIMER_DELAY)
        };

        Ok(Some(tick_id))
    }
}
