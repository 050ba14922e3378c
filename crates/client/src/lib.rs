pub mod net;

pub use net::{CirclePath, Client, ClientConfig};
