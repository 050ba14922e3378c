use std::collections::VecDeque;

use tickline::{CyclicCounter, PlayerId, Position};

/// Progress past which a skip-tick interpolation counts as finished.
const INTERPOLATION_DONE: f32 = 0.999;

/// One buffered client sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerUpdate {
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub received: u64,
    pub applied: u64,
    pub starved_ticks: u64,
    pub resyncs: u64,
    /// Ticks skipped because the head sample was not due yet.
    pub waiting_ticks: u64,
    /// Samples drained by skip-tick interpolation.
    pub skipped: u64,
}

/// Tick-aligned jitter buffer for one player's position updates.
///
/// Updates are consumed strictly FIFO, one per server tick, starting at the
/// tick the cursor was anchored to when the first update arrived. A surplus
/// that persists over the whole history window is drained by blending the
/// head sample into its successor over several ticks, so the backlog shrinks
/// by one sample without a visible jump.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    player_id: PlayerId,
    queue: VecDeque<PlayerUpdate>,
    cursor: Option<u64>,
    interpolation: Option<f32>,
    surplus_history: CyclicCounter,
    initial_offset: u64,
    step: f32,
    stats: BufferStats,
}

impl InputBuffer {
    pub fn new(player_id: PlayerId, initial_offset: u64, step: f32, window_ticks: usize) -> Self {
        Self {
            player_id,
            queue: VecDeque::new(),
            cursor: None,
            interpolation: None,
            surplus_history: CyclicCounter::new(window_ticks),
            initial_offset,
            step,
            stats: BufferStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Tick id at which the head sample is due.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    pub fn interpolation(&self) -> Option<f32> {
        self.interpolation
    }

    pub fn surplus_history(&self) -> &CyclicCounter {
        &self.surplus_history
    }

    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Queues `update`; the first one ever anchors consumption
    /// `initial_offset` ticks after `current_tick`.
    pub fn push(&mut self, update: PlayerUpdate, current_tick: u64) {
        self.queue.push_back(update);
        self.stats.received += 1;

        if self.cursor.is_none() {
            let cursor = current_tick + self.initial_offset;
            log::debug!(
                "player {} anchored at tick {} (received at {})",
                self.player_id,
                cursor,
                current_tick
            );
            self.cursor = Some(cursor);
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.interpolation = None;
    }

    /// Consumes the sample due at `tick` and returns the position to apply,
    /// or `None` when this player is skipped for the tick.
    pub fn apply_tick(&mut self, tick: u64) -> Option<Position> {
        let mut cursor = self.cursor?;

        let surplus = self.queue.len() as i32 - 1 - i32::from(self.interpolation.is_some());
        self.surplus_history.next(surplus);

        if self.queue.is_empty() {
            self.stats.starved_ticks += 1;
            log::warn!("empty buffer for player {} at tick {}", self.player_id, tick);
            return None;
        }

        if cursor < tick {
            let shift = self.initial_offset.saturating_sub(self.queue.len() as u64);
            cursor = tick + shift;
            self.cursor = Some(cursor);
            self.stats.resyncs += 1;
            log::error!(
                "resetting buffer by {} ticks for player {}",
                shift,
                self.player_id
            );
            if cursor > tick {
                return None;
            }
        }

        if cursor > tick {
            self.stats.waiting_ticks += 1;
            log::error!(
                "closest tick id in buffer {} != current tick {} for player {}",
                cursor,
                tick,
                self.player_id
            );
            return None;
        }

        let update = self.queue.pop_front()?;

        if self.interpolation.is_some() && self.queue.is_empty() {
            log::warn!(
                "resetting interpolation because of empty buffer for player {}",
                self.player_id
            );
            self.interpolation = None;
        }

        if self.interpolation.is_none() && self.surplus_history.all_at_least(1) {
            log::debug!(
                "player {} has sustained surplus, interpolating over {} ticks",
                self.player_id,
                (1.0 / self.step).round()
            );
            self.interpolation = Some(self.step);
            self.surplus_history.debit_all(1);
        }

        let mut position = update.position;

        if let Some(progress) = self.interpolation {
            if let Some(next) = self.queue.front() {
                position = update.position.lerp(next.position, progress);
            }

            let progress = progress + self.step;
            if progress > INTERPOLATION_DONE {
                self.interpolation = None;
                self.queue.pop_front();
                self.stats.skipped += 1;
                log::debug!("drop one buffer item for player {}", self.player_id);
            } else {
                self.interpolation = Some(progress);
            }
        }

        self.cursor = Some(cursor + 1);
        self.stats.applied += 1;
        Some(position)
    }
}
