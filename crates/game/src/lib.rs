pub mod diagnostics;
pub mod history;
pub mod net;
pub mod simulation;
pub mod state;

pub use diagnostics::{DiagnosticsSink, LogSink, RecordingSink, Throttle};
pub use history::{CyclicCounter, DEFAULT_HISTORY_CAPACITY};
pub use net::{
    ClientEndpoint, ClientMessage, DEFAULT_CLIENT_UPDATE_RATE, DEFAULT_SERVER_TICK_RATE, Link,
    LinkEndpoint, LinkError, LinkParams, LinkStats, PacketError, ServerEndpoint, ServerMessage,
    Transport, WireMessage,
};
pub use simulation::{
    CancelToken, Clock, IntervalTimer, MIN_TIMER_DELAY, ManualClock, SharedClock, SystemClock,
};
pub use state::{Color, GameState, PlayerId, PlayerState, Position};
