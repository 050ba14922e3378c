use std::time::Duration;

use glam::Vec2;

use tickline::Position;

/// Locally predicted motion: a fixed-radius circle around the origin, one
/// radian per second.
#[derive(Debug, Clone, Copy)]
pub struct CirclePath {
    radius: f32,
}

impl CirclePath {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position_at(&self, elapsed: Duration) -> Position {
        let (sin, cos) = elapsed.as_secs_f32().sin_cos();
        (Vec2::new(sin, cos) * self.radius).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_top_of_circle() {
        let path = CirclePath::new(100.0);
        let start = path.position_at(Duration::ZERO);
        assert!(start.x.abs() < 1e-4);
        assert!((start.y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn stays_on_radius() {
        let path = CirclePath::new(25.0);
        for ms in (0..10_000).step_by(370) {
            let p = path.position_at(Duration::from_millis(ms));
            assert!((Vec2::from(p).length() - 25.0).abs() < 1e-3);
        }
    }
}
