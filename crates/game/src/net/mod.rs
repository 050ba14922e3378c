mod endpoint;
mod protocol;
mod simulator;
mod stats;

pub use endpoint::{ClientEndpoint, Link, LinkEndpoint, LinkError, ServerEndpoint};
pub use protocol::{
    ClientMessage, DEFAULT_CLIENT_UPDATE_RATE, DEFAULT_SERVER_TICK_RATE, PacketError,
    ServerMessage, WireMessage,
};
pub use simulator::Transport;
pub use stats::{LinkParams, LinkStats};
