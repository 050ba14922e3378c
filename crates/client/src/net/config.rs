use tickline::DEFAULT_CLIENT_UPDATE_RATE;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Position updates sent to the server per second.
    pub update_rate: u32,
    /// Local simulation frames per second.
    pub render_rate: u32,
    pub circle_radius: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            update_rate: DEFAULT_CLIENT_UPDATE_RATE,
            render_rate: 60,
            circle_radius: 100.0,
        }
    }
}
