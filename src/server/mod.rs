pub mod config;
mod http_layers;
pub mod metrics;
mod routes;
pub mod server;
pub mod state;
pub mod upstream;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by the gateway binary
pub use server::{make_app, run_server};
pub use upstream::{UpstreamClient, UpstreamError, DEFAULT_UPSTREAM_URL};
