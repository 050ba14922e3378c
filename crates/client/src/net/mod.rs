pub mod client;
pub mod config;
pub mod prediction;

pub use client::Client;
pub use config::ClientConfig;
pub use prediction::CirclePath;
