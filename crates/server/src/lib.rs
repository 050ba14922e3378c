mod buffer;
mod config;
mod jitter;
mod server;

pub use buffer::{BufferStats, InputBuffer, PlayerUpdate};
pub use config::ServerConfig;
pub use jitter::{JitterReport, JitterWindow};
pub use server::{BufferStatus, Server};
