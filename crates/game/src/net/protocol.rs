use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::state::{GameState, PlayerId, Position};

pub const DEFAULT_SERVER_TICK_RATE: u32 = 30;
pub const DEFAULT_CLIENT_UPDATE_RATE: u32 = 30;

/// Messages travelling server → client.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum ServerMessage {
    Initial {
        player_id: PlayerId,
        game_state: GameState,
    },
    GameStateUpdate {
        game_state: GameState,
    },
}

/// Messages travelling client → server.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum ClientMessage {
    PlayerPositionUpdate { position: Position },
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

/// A message that can cross the simulated link as bytes.
pub trait WireMessage: Sized {
    fn encode(&self) -> Result<AlignedVec, PacketError>;
    fn decode(data: &[u8]) -> Result<Self, PacketError>;
}

impl WireMessage for ServerMessage {
    fn encode(&self) -> Result<AlignedVec, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self).map_err(PacketError::Serialize)
    }

    fn decode(data: &[u8]) -> Result<Self, PacketError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)
    }
}

impl WireMessage for ClientMessage {
    fn encode(&self) -> Result<AlignedVec, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self).map_err(PacketError::Serialize)
    }

    fn decode(data: &[u8]) -> Result<Self, PacketError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Color, PlayerState};

    #[test]
    fn initial_message_survives_the_wire() {
        let player_id = PlayerId::from_sequence(1);
        let message = ServerMessage::Initial {
            player_id: player_id.clone(),
            game_state: GameState {
                players: vec![PlayerState {
                    player_id,
                    color: Color::Red,
                    position: Position::new(3.5, -2.0),
                }],
            },
        };

        let bytes = message.encode().unwrap();
        assert_eq!(ServerMessage::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn garbage_is_rejected() {
        let mut bytes = AlignedVec::<16>::new();
        bytes.extend_from_slice(&[0xff; 3]);
        assert!(ClientMessage::decode(&bytes).is_err());
    }
}
