mod file_config;

pub use file_config::{BatchConfig, ClassifierConfig, FileConfig, GatewayConfig, PollingConfig};

use crate::classify::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::ingest::PollPolicy;
use crate::pipeline::BatchPolicy;
use crate::server::{RequestsLoggingLevel, DEFAULT_UPSTREAM_URL};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

/// CLI arguments that can be used for monitor config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct MonitorCliConfig {
    pub gateway_url: String,
    pub source: String,
    pub max_results: u32,
    pub request_timeout_sec: u64,
    pub offline: bool,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    // Core settings
    pub gateway_url: String,
    pub source: String,
    pub max_results: u32,
    pub request_timeout_sec: u64,
    pub offline: bool,

    // Feature configs (with defaults)
    pub polling: PollingSettings,
    pub batch: BatchSettings,
    pub classifier: ClassifierSettings,
}

impl MonitorConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &MonitorCliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let gateway_url = file.gateway_url.unwrap_or_else(|| cli.gateway_url.clone());
        if gateway_url.trim().is_empty() {
            bail!("gateway_url must be specified via --gateway-url or in config file");
        }

        let source = file.source.unwrap_or_else(|| cli.source.clone());
        if source.trim().is_empty() {
            bail!("source must not be empty");
        }

        let max_results = file.max_results.unwrap_or(cli.max_results);
        if max_results == 0 {
            bail!("max_results must be at least 1");
        }

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);

        // Polling settings - merge file config with defaults
        let polling_file = file.polling.unwrap_or_default();
        let polling = PollingSettings {
            initial_delay_ms: polling_file.initial_delay_ms.unwrap_or(2000),
            backoff_step_ms: polling_file.backoff_step_ms.unwrap_or(2000),
            transient_retry_delay_ms: polling_file.transient_retry_delay_ms.unwrap_or(2000),
            max_attempts: polling_file.max_attempts.unwrap_or(10),
        };
        if polling.max_attempts == 0 {
            bail!("polling.max_attempts must be at least 1");
        }

        let batch_file = file.batch.unwrap_or_default();
        let batch = BatchSettings {
            batch_size: batch_file.batch_size.unwrap_or(3),
            reveal_delay_ms: batch_file.reveal_delay_ms.unwrap_or(1000),
        };
        if batch.batch_size == 0 {
            bail!("batch.batch_size must be at least 1");
        }

        // Classifier settings - TOML [classifier] section takes precedence
        // over the CLI overrides, which in turn beat the built-in defaults.
        let classifier_file = file.classifier.unwrap_or_default();
        let classifier = ClassifierSettings {
            base_url: classifier_file
                .base_url
                .or_else(|| cli.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: classifier_file
                .model
                .or_else(|| cli.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: classifier_file.api_key.or_else(|| cli.api_key.clone()),
            api_key_command: classifier_file
                .api_key_command
                .or_else(|| cli.api_key_command.clone()),
            max_attempts: classifier_file.max_attempts.unwrap_or(3),
            backoff_step_ms: classifier_file.backoff_step_ms.unwrap_or(1000),
        };
        if classifier.max_attempts == 0 {
            bail!("classifier.max_attempts must be at least 1");
        }

        Ok(Self {
            gateway_url,
            source,
            max_results,
            request_timeout_sec,
            offline: cli.offline,
            polling,
            batch,
            classifier,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    pub initial_delay_ms: u64,
    pub backoff_step_ms: u64,
    pub transient_retry_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2000,
            backoff_step_ms: 2000,
            transient_retry_delay_ms: 2000,
            max_attempts: 10,
        }
    }
}

impl PollingSettings {
    pub fn to_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_step: Duration::from_millis(self.backoff_step_ms),
            transient_retry_delay: Duration::from_millis(self.transient_retry_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub reveal_delay_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            reveal_delay_ms: 1000,
        }
    }
}

impl BatchSettings {
    pub fn to_policy(&self) -> BatchPolicy {
        BatchPolicy {
            batch_size: self.batch_size,
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_command: None,
            max_attempts: 3,
            backoff_step_ms: 1000,
        }
    }
}

impl ClassifierSettings {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// CLI arguments that can be used for gateway config resolution.
#[derive(Debug, Clone, Default)]
pub struct GatewayCliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub source: String,
    pub upstream_url: Option<String>,
    pub upstream_token: Option<String>,
    pub upstream_token_command: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub search_timeout_sec: u64,
    pub result_timeout_sec: u64,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub port: u16,
    pub metrics_port: u16,
    pub source: String,
    pub upstream_url: String,
    pub upstream_token: Option<String>,
    pub upstream_token_command: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub search_timeout_sec: u64,
    pub result_timeout_sec: u64,
    pub logging_level: RequestsLoggingLevel,
}

impl GatewaySettings {
    /// Resolve gateway configuration from CLI arguments and the optional
    /// `[gateway]` section of the TOML file config.
    pub fn resolve(cli: &GatewayCliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default().gateway.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let source = file.source.unwrap_or_else(|| cli.source.clone());
        if source.trim().is_empty() {
            bail!("source must not be empty");
        }

        let upstream_url = file
            .upstream_url
            .or_else(|| cli.upstream_url.clone())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        if upstream_url.trim().is_empty() {
            bail!("upstream_url must not be empty");
        }

        let upstream_token = file.upstream_token.or_else(|| cli.upstream_token.clone());
        let upstream_token_command = file
            .upstream_token_command
            .or_else(|| cli.upstream_token_command.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let search_timeout_sec = file.search_timeout_sec.unwrap_or(cli.search_timeout_sec);
        if search_timeout_sec == 0 {
            bail!("search_timeout_sec must be at least 1");
        }
        let result_timeout_sec = file.result_timeout_sec.unwrap_or(cli.result_timeout_sec);
        if result_timeout_sec == 0 {
            bail!("result_timeout_sec must be at least 1");
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            port,
            metrics_port,
            source,
            upstream_url,
            upstream_token,
            upstream_token_command,
            frontend_dir_path,
            search_timeout_sec,
            result_timeout_sec,
            logging_level,
        })
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_sec)
    }

    pub fn result_timeout(&self) -> Duration {
        Duration::from_secs(self.result_timeout_sec)
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
