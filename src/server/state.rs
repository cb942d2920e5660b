use axum::extract::FromRef;

use std::sync::Arc;
use std::time::Instant;

use super::upstream::UpstreamClient;
use super::ServerConfig;

pub type GuardedUpstream = Arc<UpstreamClient>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub upstream: GuardedUpstream,
}

impl ServerState {
    pub fn new(config: ServerConfig, upstream: GuardedUpstream) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            upstream,
        }
    }
}

impl FromRef<ServerState> for GuardedUpstream {
    fn from_ref(input: &ServerState) -> Self {
        input.upstream.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
