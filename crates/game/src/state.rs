use std::fmt;

use glam::Vec2;
use rkyv::{Archive, Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Position, t: f32) -> Position {
        Vec2::from(self).lerp(Vec2::from(other), t).into()
    }

    pub fn distance(self, other: Position) -> f32 {
        Vec2::from(self).distance(Vec2::from(other))
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Position> for Vec2 {
    fn from(p: Position) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Server-assigned player identity, rendered as `id:<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PlayerId(String);

impl PlayerId {
    pub fn from_sequence(n: u32) -> Self {
        Self(format!("id:{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Orange,
}

impl Color {
    pub const PALETTE: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Orange];

    /// Palette color for the `index`-th connected player, cycling.
    pub fn for_slot(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub color: Color,
    pub position: Position,
}

/// Ordered by connection; entries are never reordered or removed.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct GameState {
    pub players: Vec<PlayerState>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn index_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.player_id == player_id)
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.player_id == player_id)
    }

    pub fn get_mut(&mut self, player_id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| &p.player_id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_ids_are_sequential_strings() {
        assert_eq!(PlayerId::from_sequence(1).as_str(), "id:1");
        assert_eq!(PlayerId::from_sequence(12).to_string(), "id:12");
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(Color::for_slot(0), Color::Red);
        assert_eq!(Color::for_slot(1), Color::Blue);
        assert_eq!(Color::for_slot(4), Color::Red);
        assert_eq!(Color::for_slot(7), Color::Orange);
    }

    #[test]
    fn position_lerp() {
        let from = Position::new(0.0, 10.0);
        let to = Position::new(10.0, 20.0);

        let mid = from.lerp(to, 0.5);
        assert!((mid.x - 5.0).abs() < 0.001);
        assert!((mid.y - 15.0).abs() < 0.001);
        assert_eq!(from.lerp(to, 0.0), from);
    }
}
