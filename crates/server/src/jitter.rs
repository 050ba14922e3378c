use std::fmt;
use std::time::Duration;

/// Rolling estimate of how far update arrivals stray from the nominal
/// client interval. Positive spread means an update arrived early.
#[derive(Debug, Clone)]
pub struct JitterWindow {
    nominal_ms: f64,
    spreads: Vec<f64>,
    index: usize,
    sum: f64,
    last_arrival: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterReport {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

impl JitterReport {
    pub fn window(&self) -> f64 {
        self.max - self.min
    }

    pub fn bias(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl fmt::Display for JitterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min spread: {:>6.1} max spread: {:>6.1} spread window: {:>6.1} spread bias: {:>6.1} spread sum bias: {:>6.1}",
            self.min,
            self.max,
            self.window(),
            self.bias(),
            self.sum
        )
    }
}

impl JitterWindow {
    /// One slot per expected update in a second.
    pub fn new(client_update_rate: u32) -> Self {
        let rate = client_update_rate.max(1);
        Self {
            nominal_ms: 1000.0 / rate as f64,
            spreads: vec![0.0; rate as usize],
            index: 0,
            sum: 0.0,
            last_arrival: None,
        }
    }

    /// Records an arrival at `now`. The first arrival only sets the baseline.
    pub fn record_arrival(&mut self, now: Duration) -> Option<JitterReport> {
        let previous = self.last_arrival.replace(now)?;
        let delta_ms = now.saturating_sub(previous).as_secs_f64() * 1000.0;
        let spread = self.nominal_ms - delta_ms;

        self.sum += spread - self.spreads[self.index];
        self.spreads[self.index] = spread;
        self.index = (self.index + 1) % self.spreads.len();

        Some(self.report())
    }

    pub fn report(&self) -> JitterReport {
        let min = self.spreads.iter().copied().fold(0.0, f64::min);
        let max = self.spreads.iter().copied().fold(0.0, f64::max);
        JitterReport {
            min,
            max,
            sum: self.sum,
        }
    }
}
