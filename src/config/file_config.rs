use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub gateway_url: Option<String>,
    pub source: Option<String>,
    pub max_results: Option<u32>,
    pub request_timeout_sec: Option<u64>,

    // Feature configs
    pub polling: Option<PollingConfig>,
    pub batch: Option<BatchConfig>,
    pub classifier: Option<ClassifierConfig>,
    pub gateway: Option<GatewayConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub initial_delay_ms: Option<u64>,
    pub backoff_step_ms: Option<u64>,
    pub transient_retry_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BatchConfig {
    pub batch_size: Option<usize>,
    pub reveal_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub max_attempts: Option<u32>,
    pub backoff_step_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub source: Option<String>,
    pub upstream_url: Option<String>,
    pub upstream_token: Option<String>,
    pub upstream_token_command: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub search_timeout_sec: Option<u64>,
    pub result_timeout_sec: Option<u64>,
    pub logging_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
