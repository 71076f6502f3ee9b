// lampshade-api: Async Rust client for the hub's REST API (entity states + light services)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::HubClient;
pub use error::Error;
pub use models::{ServiceCall, StateAttributes, StateResponse};
pub use transport::{TlsMode, TransportConfig};
