use std::rc::Rc;
use std::time::Duration;

use tickline::{
    ClientMessage, Clock, GameState, Link, LinkError, LinkParams, ManualClock, PlayerId, Position,
    ServerMessage,
};

fn position_update(n: usize) -> ClientMessage {
    ClientMessage::PlayerPositionUpdate {
        position: Position::new(n as f32, 0.0),
    }
}

fn sequence_of(message: &ClientMessage) -> usize {
    match message {
        ClientMessage::PlayerPositionUpdate { position } => position.x as usize,
    }
}

#[test]
fn test_jittered_link_preserves_send_order() {
    let clock = ManualClock::new();
    let params = LinkParams::new(40.0, 35.0);
    let link = Link::seeded(params, Rc::new(clock.clone()), 42);

    let mut sent_at = Vec::new();
    let mut received = Vec::new();

    for step in 0..2000 {
        if step % 3 == 0 && sent_at.len() < 500 {
            link.client.send(&position_update(sent_at.len())).unwrap();
            sent_at.push(clock.now());
        }

        for message in link.server.receive().unwrap() {
            let n = sequence_of(&message);
            let delay = clock.now() - sent_at[n];
            assert!(delay <= params.max_delay(), "message {n} took {delay:?}");
            received.push(n);
        }

        clock.advance(Duration::from_millis(1));
    }

    assert_eq!(received, (0..500).collect::<Vec<_>>());

    let stats = link.server.inbound_stats();
    assert_eq!(stats.messages_sent, 500);
    assert_eq!(stats.messages_delivered, 500);
    assert!(stats.parked > 0);
}

#[test]
fn test_directions_are_independent() {
    let clock = ManualClock::new();
    let link = Link::seeded(LinkParams::new(10.0, 0.0), Rc::new(clock.clone()), 1);

    link.client.send(&position_update(7)).unwrap();
    link.server
        .send(&ServerMessage::GameStateUpdate {
            game_state: GameState::new(),
        })
        .unwrap();

    clock.advance(Duration::from_millis(10));

    let at_server = link.server.receive().unwrap();
    assert_eq!(at_server.len(), 1);
    assert_eq!(sequence_of(&at_server[0]), 7);

    let at_client = link.client.receive().unwrap();
    assert!(matches!(
        at_client.as_slice(),
        [ServerMessage::GameStateUpdate { game_state }] if game_state.is_empty()
    ));

    assert!(link.client.receive().unwrap().is_empty());
}

#[test]
fn test_messages_are_copies() {
    let clock = ManualClock::new();
    let link = Link::seeded(LinkParams::new(0.0, 0.0), Rc::new(clock.clone()), 1);

    let player_id = PlayerId::from_sequence(1);
    let mut game_state = GameState::new();
    game_state.players.push(tickline::PlayerState {
        player_id: player_id.clone(),
        color: tickline::Color::Red,
        position: Position::new(1.0, 2.0),
    });

    link.server
        .send(&ServerMessage::Initial {
            player_id: player_id.clone(),
            game_state: game_state.clone(),
        })
        .unwrap();
    game_state.players[0].position = Position::new(9.0, 9.0);

    match link.client.receive().unwrap().pop() {
        Some(ServerMessage::Initial {
            player_id: received_id,
            game_state: received,
        }) => {
            assert_eq!(received_id, player_id);
            assert_eq!(received.players[0].position, Position::new(1.0, 2.0));
        }
        other => panic!("Expected Initial, got {other:?}"),
    }
}

#[test]
fn test_send_to_dropped_peer_is_rejected() {
    let clock = ManualClock::new();
    let (client, server) = Link::new(LinkParams::default(), Rc::new(clock)).into_parts();

    assert!(client.is_attached());
    drop(server);

    assert!(!client.is_attached());
    assert!(matches!(
        client.send(&position_update(0)),
        Err(LinkError::Detached)
    ));
    assert!(client.outbound_stats().is_none());
}
