use std::time::Duration;

use rand::Rng;

/// Characteristics of one simulated physical link, shared by both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkParams {
    pub avg_delay_ms: f64,
    pub spread_ms: f64,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            avg_delay_ms: 100.0,
            spread_ms: 0.25,
        }
    }
}

impl LinkParams {
    pub fn new(avg_delay_ms: f64, spread_ms: f64) -> Self {
        Self {
            avg_delay_ms,
            spread_ms: spread_ms.abs(),
        }
    }

    /// Upper bound of any single message's one-way delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64((self.avg_delay_ms + self.spread_ms).max(0.0) / 1000.0)
    }

    /// `max(0, avg + uniform(-spread, +spread))`.
    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = if self.spread_ms > 0.0 {
            rng.gen_range(-self.spread_ms..=self.spread_ms)
        } else {
            0.0
        };
        Duration::from_secs_f64((self.avg_delay_ms + jitter).max(0.0) / 1000.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub messages_sent: u64,
    pub messages_delivered: u64,
    pub bytes_sent: u64,
    /// Messages whose delay elapsed while an earlier one was still in flight.
    pub parked: u64,
}
