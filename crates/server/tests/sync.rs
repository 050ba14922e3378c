use std::rc::Rc;
use std::time::Duration;

use tickline::{
    ClientEndpoint, ClientMessage, Color, Link, LinkParams, ManualClock, Position, RecordingSink,
    ServerMessage,
};
use tickline_client::{Client, ClientConfig};
use tickline_server::{Server, ServerConfig};

fn server(config: ServerConfig, clock: &ManualClock) -> Server {
    Server::seeded(
        config,
        Rc::new(clock.clone()),
        Box::new(RecordingSink::new()),
        7,
    )
}

/// Time just after tick `k` of a 30 Hz loop started at `origin`.
fn tick_time(origin: Duration, k: u64) -> Duration {
    origin + Duration::from_millis(k * 100 / 3 + 1)
}

fn send_x(endpoint: &ClientEndpoint, x: f32) {
    endpoint
        .send(&ClientMessage::PlayerPositionUpdate {
            position: Position::new(x, 1.0),
        })
        .unwrap();
}

#[test]
fn test_update_is_applied_after_initial_offset() {
    let clock = ManualClock::new();
    let mut server = server(ServerConfig::default(), &clock);
    let (client_end, server_end) =
        Link::seeded(LinkParams::new(100.0, 0.0), Rc::new(clock.clone()), 3).into_parts();
    server.attach_player_link(server_end).unwrap();

    client_end
        .send(&ClientMessage::PlayerPositionUpdate {
            position: Position::new(1.0, 1.0),
        })
        .unwrap();

    // The loop starts right when the update lands.
    let origin = Duration::from_millis(100);
    clock.set(origin);
    server.start();

    let target = Position::new(1.0, 1.0);
    let mut applied_at = None;
    for k in 0..6 {
        clock.set(tick_time(origin, k));
        server.update().unwrap();
        assert_eq!(server.tick_id(), k + 1);

        if applied_at.is_none() && server.game_state().players[0].position == target {
            applied_at = Some(k);
        }
    }
    assert_eq!(applied_at, Some(4));

    // Stop ticking and let the broadcasts of ticks 0..=5 arrive.
    clock.advance(Duration::from_millis(200));
    let messages = client_end.receive().unwrap();
    assert_eq!(messages.len(), 7);
    assert!(matches!(messages[0], ServerMessage::Initial { .. }));

    let broadcast_positions: Vec<Position> = messages[1..]
        .iter()
        .map(|message| match message {
            ServerMessage::GameStateUpdate { game_state } => game_state.players[0].position,
            other => panic!("Expected GameStateUpdate, got {other:?}"),
        })
        .collect();
    assert!(broadcast_positions[..4].iter().all(|p| *p != target));
    assert_eq!(broadcast_positions[4], target);
}

#[test]
fn test_players_get_sequential_ids_and_palette_colors() {
    let clock = ManualClock::new();
    let shared = Rc::new(clock.clone());
    let mut server = server(ServerConfig::default(), &clock);

    let mut clients = Vec::new();
    for seed in 0..2 {
        let (client_end, server_end) =
            Link::seeded(LinkParams::new(10.0, 0.0), shared.clone(), seed).into_parts();
        server.attach_player_link(server_end).unwrap();
        clients.push(Client::new(ClientConfig::default(), client_end, shared.clone()));
    }

    clock.advance(Duration::from_millis(10));
    for client in &mut clients {
        client.update().unwrap();
    }

    let ids: Vec<&str> = clients
        .iter()
        .map(|c| c.player_id().unwrap().as_str())
        .collect();
    assert_eq!(ids, vec!["id:1", "id:2"]);

    let colors: Vec<Color> = server.game_state().players.iter().map(|p| p.color).collect();
    assert_eq!(colors, vec![Color::Red, Color::Blue]);

    // The first player joined alone; the second sees both.
    assert_eq!(clients[0].game_state().unwrap().len(), 1);
    assert_eq!(clients[1].game_state().unwrap().len(), 2);
}

#[test]
fn test_starvation_burst_is_replayed_in_order() {
    let clock = ManualClock::new();
    let config = ServerConfig {
        // Keep surplus draining out of the picture.
        surplus_window_ticks: 1000,
        ..Default::default()
    };
    let mut server = server(config, &clock);
    let (client_end, server_end) =
        Link::seeded(LinkParams::new(0.0, 0.0), Rc::new(clock.clone()), 1).into_parts();
    let player_id = server.attach_player_link(server_end).unwrap();
    server.start();

    let mut observed = Vec::new();
    for k in 0..40u64 {
        match k {
            0..10 => send_x(&client_end, 100.0 + k as f32),
            10..16 => {}
            16 => (10..=16).for_each(|n| send_x(&client_end, 100.0 + n as f32)),
            _ => send_x(&client_end, 100.0 + k as f32),
        }

        clock.set(tick_time(Duration::ZERO, k));
        server.update().unwrap();
        assert_eq!(server.tick_id(), k + 1);

        let x = server.game_state().players[0].position.x;
        if x >= 100.0 && observed.last() != Some(&x) {
            observed.push(x);
        }
    }

    let expected: Vec<f32> = (0..observed.len()).map(|n| 100.0 + n as f32).collect();
    assert_eq!(observed, expected);
    assert!(observed.len() > 25);

    let stats = server.buffer_status(&player_id).unwrap().stats;
    assert_eq!(stats.starved_ticks, 2);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_circling_player_is_replicated_to_everyone() {
    let clock = ManualClock::new();
    let shared = Rc::new(clock.clone());
    let mut server = server(ServerConfig::default(), &clock);

    let mut clients = Vec::new();
    for seed in 0..2u64 {
        let (client_end, server_end) =
            Link::seeded(LinkParams::new(32.0, 5.0), shared.clone(), 100 + seed * 2).into_parts();
        server.attach_player_link(server_end).unwrap();
        clients.push(Client::new(ClientConfig::default(), client_end, shared.clone()));
    }
    clients[0].start_circling();

    let spawn_of_second = server.game_state().players[1].position;
    server.start();

    for _ in 0..3000 {
        server.update().unwrap();
        for client in &mut clients {
            client.update().unwrap();
        }
        clock.advance(Duration::from_millis(1));
    }

    let on_circle = |p: Position| (p.distance(Position::ORIGIN) - 100.0).abs() < 0.5;
    let at_spawn = |p: Position| p.distance(spawn_of_second) < 1e-3;

    let authoritative = server.game_state();
    assert!(on_circle(authoritative.players[0].position));
    assert!(at_spawn(authoritative.players[1].position));

    // The circling client renders its own prediction, never the server copy.
    let own_view = clients[0].game_state().unwrap();
    assert_eq!(&own_view.players[0], clients[0].player_state().unwrap());

    // The idle client sees the mover through server snapshots.
    let other_view = clients[1].game_state().unwrap();
    assert!(on_circle(other_view.players[0].position));
    assert!(at_spawn(other_view.players[1].position));

    let stats = server
        .buffer_status(clients[0].player_id().unwrap())
        .unwrap()
        .stats;
    assert!(stats.applied > 60, "{stats:?}");

    for client in &mut clients {
        client.shutdown();
    }
    server.shutdown();
    assert!(!server.is_running());
}
