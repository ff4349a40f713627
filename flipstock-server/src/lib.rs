//! HTTP surface of flipstock

pub mod config;
pub mod handlers;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use server::FlipstockServer;
pub use state::{AppState, Store};
