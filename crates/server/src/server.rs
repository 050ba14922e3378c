use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tickline::{
    ClientMessage, Color, DiagnosticsSink, GameState, IntervalTimer, LinkError, PlayerId,
    PlayerState, Position, ServerEndpoint, ServerMessage, SharedClock, Throttle,
};

use crate::buffer::{BufferStats, InputBuffer, PlayerUpdate};
use crate::config::ServerConfig;
use crate::jitter::JitterWindow;

struct PlayerRecord {
    player_id: PlayerId,
    /// Index of this player's entry in the authoritative game state.
    slot: usize,
    endpoint: ServerEndpoint,
    buffer: InputBuffer,
    jitter: JitterWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStatus {
    pub buffered: usize,
    pub cursor: Option<u64>,
    pub interpolation: Option<f32>,
    pub stats: BufferStats,
}

struct ServerState {
    config: ServerConfig,
    clock: SharedClock,
    players: Vec<PlayerRecord>,
    game_state: GameState,
    last_player_id: u32,
    rng: StdRng,
    diagnostics: Box<dyn DiagnosticsSink>,
    /// Shared by all players: the sink sees at most one report per interval.
    report_throttle: Throttle,
}

/// Authoritative game server.
///
/// Player input is buffered per player and replayed one sample per tick;
/// after every tick the full game state is broadcast to all players.
pub struct Server {
    timer: IntervalTimer,
    state: ServerState,
    shut_down: bool,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        clock: SharedClock,
        diagnostics: Box<dyn DiagnosticsSink>,
    ) -> Self {
        Self::with_rng(config, clock, diagnostics, StdRng::from_entropy())
    }

    /// Server whose spawn positions are reproducible.
    pub fn seeded(
        config: ServerConfig,
        clock: SharedClock,
        diagnostics: Box<dyn DiagnosticsSink>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, clock, diagnostics, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: ServerConfig,
        clock: SharedClock,
        diagnostics: Box<dyn DiagnosticsSink>,
        rng: StdRng,
    ) -> Self {
        let timer = IntervalTimer::new(config.tick_interval(), clock.clone());
        let report_throttle = Throttle::new(config.report_interval());
        Self {
            timer,
            state: ServerState {
                config,
                clock,
                players: Vec::new(),
                game_state: GameState::new(),
                last_player_id: 0,
                rng,
                diagnostics,
                report_throttle,
            },
            shut_down: false,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Ticks completed so far.
    pub fn tick_id(&self) -> u64 {
        self.timer.tick_id()
    }

    pub fn game_state(&self) -> &GameState {
        &self.state.game_state
    }

    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn buffer_status(&self, player_id: &PlayerId) -> Option<BufferStatus> {
        self.state
            .players
            .iter()
            .find(|p| &p.player_id == player_id)
            .map(|p| BufferStatus {
                buffered: p.buffer.len(),
                cursor: p.buffer.cursor(),
                interpolation: p.buffer.interpolation(),
                stats: p.buffer.stats(),
            })
    }

    /// Registers a new player behind `endpoint` and sends it the initial
    /// snapshot.
    pub fn attach_player_link(&mut self, endpoint: ServerEndpoint) -> Result<PlayerId, LinkError> {
        self.state.attach_player(endpoint)
    }

    pub fn start(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!(
            "server loop started at {} Hz ({} players)",
            self.state.config.tick_rate,
            self.state.players.len()
        );
        self.timer.start();
    }

    /// Drains player links, then runs the tick if one is due.
    pub fn update(&mut self) -> Result<(), LinkError> {
        if self.shut_down {
            return Ok(());
        }
        self.state.process_network(self.timer.tick_id())?;
        self.timer.run_due(|tick_id| self.state.tick(tick_id))?;
        Ok(())
    }

    /// Stops the tick loop and discards every unconsumed update.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.timer.stop();
        for player in &mut self.state.players {
            player.buffer.clear();
        }
        log::info!("server stopped after {} ticks", self.timer.tick_id());
    }
}

impl ServerState {
    fn attach_player(&mut self, endpoint: ServerEndpoint) -> Result<PlayerId, LinkError> {
        self.last_player_id += 1;
        let player_id = PlayerId::from_sequence(self.last_player_id);

        let slot = self.game_state.len();
        let half = self.config.spawn_extent / 2.0;
        let position = if half > 0.0 {
            Position::new(
                self.rng.gen_range(-half..half),
                self.rng.gen_range(-half..half),
            )
        } else {
            Position::ORIGIN
        };

        let player_state = PlayerState {
            player_id: player_id.clone(),
            color: Color::for_slot(slot),
            position,
        };

        let mut game_state = self.game_state.clone();
        game_state.players.push(player_state.clone());
        endpoint.send(&ServerMessage::Initial {
            player_id: player_id.clone(),
            game_state,
        })?;

        // Only a player that received its snapshot joins the game.
        self.game_state.players.push(player_state);

        self.players.push(PlayerRecord {
            player_id: player_id.clone(),
            slot,
            endpoint,
            buffer: InputBuffer::new(
                player_id.clone(),
                self.config.initial_buffer_offset,
                self.config.skip_tick_step(),
                self.config.surplus_window_ticks,
            ),
            jitter: JitterWindow::new(self.config.client_update_rate),
        });

        log::info!(
            "player {} attached as {} at ({:.1}, {:.1})",
            player_id,
            Color::for_slot(slot).as_str(),
            position.x,
            position.y
        );

        Ok(player_id)
    }

    fn process_network(&mut self, tick_id: u64) -> Result<(), LinkError> {
        let now = self.clock.now();

        for player in &mut self.players {
            for message in player.endpoint.receive()? {
                match message {
                    ClientMessage::PlayerPositionUpdate { position } => {
                        player.buffer.push(PlayerUpdate { position }, tick_id);

                        if let Some(report) = player.jitter.record_arrival(now) {
                            if self.report_throttle.ready(now) {
                                self.diagnostics
                                    .report(&format!("{} {}", player.player_id, report));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn tick(&mut self, tick_id: u64) -> Result<(), LinkError> {
        if self.players.is_empty() {
            return Ok(());
        }

        self.apply_tick_changes(tick_id);
        self.broadcast_state()
    }

    fn apply_tick_changes(&mut self, tick_id: u64) {
        for player in &mut self.players {
            if let Some(position) = player.buffer.apply_tick(tick_id) {
                self.game_state.players[player.slot].position = position;
            }
        }
    }

    fn broadcast_state(&self) -> Result<(), LinkError> {
        let message = ServerMessage::GameStateUpdate {
            game_state: self.game_state.clone(),
        };

        for player in &self.players {
            player.endpoint.send(&message)?;
        }

        Ok(())
    }
}
