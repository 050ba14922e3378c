use std::time::Duration;

use tickline::{DEFAULT_CLIENT_UPDATE_RATE, DEFAULT_SERVER_TICK_RATE};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate: u32,
    /// Nominal rate at which clients send position updates.
    pub client_update_rate: u32,
    /// Ticks between a player's first update and its first consumption.
    pub initial_buffer_offset: u64,
    /// Time over which one unit of sustained surplus is drained.
    pub smoothing_period_ms: f64,
    /// Ticks of surplus history required before draining starts.
    pub surplus_window_ticks: usize,
    pub spawn_extent: f32,
    pub report_interval_ms: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_SERVER_TICK_RATE,
            client_update_rate: DEFAULT_CLIENT_UPDATE_RATE,
            initial_buffer_offset: 4,
            smoothing_period_ms: 500.0,
            surplus_window_ticks: 30,
            spawn_extent: 100.0,
            report_interval_ms: 500.0,
        }
    }
}

impl ServerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    pub fn client_update_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.client_update_rate.max(1) as f64)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs_f64(self.report_interval_ms.max(0.0) / 1000.0)
    }

    /// Interpolation progress added per tick while draining surplus.
    pub fn skip_tick_step(&self) -> f32 {
        // smoothing / (1000 / rate), kept in rate form so 500ms at 30Hz is 15, not 16
        let exact = self.smoothing_period_ms * self.tick_rate.max(1) as f64 / 1000.0;
        let ticks = (exact - 1e-9).ceil().max(1.0);
        (1.0 / ticks) as f32
    }
}
