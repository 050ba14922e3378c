use tickline::{
    ClientEndpoint, ClientMessage, GameState, IntervalTimer, LinkError, PlayerId, PlayerState,
    ServerMessage, SharedClock,
};

use super::config::ClientConfig;
use super::prediction::CirclePath;

struct ClientState {
    endpoint: ClientEndpoint,
    clock: SharedClock,
    path: CirclePath,
    player_id: Option<PlayerId>,
    server_game_state: Option<GameState>,
    game_state: Option<GameState>,
    player_state: Option<PlayerState>,
    /// Index of the own entry in `game_state`.
    own_slot: Option<usize>,
}

/// Game client with local prediction for its own player.
///
/// Runs two independent drivers: a render-rate frame loop that moves the own
/// player locally, and a fixed-rate uplink that reports the predicted
/// position to the server.
pub struct Client {
    state: ClientState,
    render_timer: IntervalTimer,
    uplink_timer: IntervalTimer,
    shut_down: bool,
}

impl Client {
    pub fn new(config: ClientConfig, endpoint: ClientEndpoint, clock: SharedClock) -> Self {
        Self {
            render_timer: IntervalTimer::from_rate(config.render_rate, clock.clone()),
            uplink_timer: IntervalTimer::from_rate(config.update_rate, clock.clone()),
            state: ClientState {
                endpoint,
                clock,
                path: CirclePath::new(config.circle_radius),
                player_id: None,
                server_game_state: None,
                game_state: None,
                player_state: None,
                own_slot: None,
            },
            shut_down: false,
        }
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.state.player_id.as_ref()
    }

    /// Locally predicted state of the own player.
    pub fn player_state(&self) -> Option<&PlayerState> {
        self.state.player_state.as_ref()
    }

    /// Snapshot to render: the last server state with the own entry
    /// replaced by the local prediction.
    pub fn game_state(&self) -> Option<&GameState> {
        self.state.game_state.as_ref()
    }

    /// Last snapshot exactly as the server sent it.
    pub fn server_game_state(&self) -> Option<&GameState> {
        self.state.server_game_state.as_ref()
    }

    pub fn is_uplink_running(&self) -> bool {
        self.uplink_timer.is_running()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_timer.tick_id()
    }

    pub fn updates_sent(&self) -> u64 {
        self.uplink_timer.tick_id()
    }

    /// Starts moving the own player along its circle at render rate.
    pub fn start_circling(&mut self) {
        if self.shut_down {
            return;
        }
        self.render_timer.start();
    }

    /// Drains the link, then runs a due frame and a due uplink send.
    pub fn update(&mut self) -> Result<(), LinkError> {
        if self.shut_down {
            return Ok(());
        }

        for message in self.state.endpoint.receive()? {
            match message {
                ServerMessage::Initial {
                    player_id,
                    game_state,
                } => {
                    self.state.on_initial(player_id, game_state);
                    self.uplink_timer.start();
                }
                ServerMessage::GameStateUpdate { game_state } => {
                    self.state.on_game_state_update(game_state);
                }
            }
        }

        self.render_timer.run_due(|_| {
            self.state.circling_logic();
            Ok::<_, LinkError>(())
        })?;
        self.uplink_timer.run_due(|_| self.state.send_position())?;

        Ok(())
    }

    /// Stops both drivers. Messages already on the link still arrive.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.render_timer.stop();
        self.uplink_timer.stop();
        if let Some(player_id) = &self.state.player_id {
            log::info!("client {} stopped", player_id);
        }
    }
}

impl ClientState {
    fn on_initial(&mut self, player_id: PlayerId, game_state: GameState) {
        self.own_slot = game_state.index_of(&player_id);
        self.player_state = game_state.get(&player_id).cloned();
        if self.player_state.is_none() {
            log::warn!("initial snapshot has no entry for {}", player_id);
        }

        log::info!(
            "client joined as {} ({} players)",
            player_id,
            game_state.len()
        );

        self.player_id = Some(player_id);
        self.server_game_state = Some(game_state.clone());
        self.game_state = Some(game_state);
    }

    fn on_game_state_update(&mut self, game_state: GameState) {
        let own = self.player_state.as_ref();
        let players = game_state
            .players
            .iter()
            .map(|player| match own {
                Some(own) if own.player_id == player.player_id => own.clone(),
                _ => player.clone(),
            })
            .collect();

        self.own_slot = self
            .player_id
            .as_ref()
            .and_then(|id| game_state.index_of(id));
        self.game_state = Some(GameState { players });
        self.server_game_state = Some(game_state);
    }

    fn circling_logic(&mut self) {
        let Some(player_state) = self.player_state.as_mut() else {
            return;
        };

        let position = self.path.position_at(self.clock.now());
        player_state.position = position;

        if let (Some(game_state), Some(slot)) = (self.game_state.as_mut(), self.own_slot) {
            if let Some(entry) = game_state.players.get_mut(slot) {
                entry.position = position;
            }
        }
    }

    fn send_position(&self) -> Result<(), LinkError> {
        let Some(player_state) = &self.player_state else {
            return Ok(());
        };
        self.endpoint.send(&ClientMessage::PlayerPositionUpdate {
            position: player_state.position,
        })
    }
}
