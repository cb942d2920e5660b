//! API key and bearer token sourcing for outbound clients.
//!
//! Keys are never baked into the binary. They come from configuration or
//! from a shell command executed at request time (rotating tokens, secret
//! stores).

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for key command execution.
const KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of an API key or bearer token.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// No authentication.
    None,
    /// Static key from configuration.
    Static(String),
    /// Shell command that outputs the key (for rotating tokens).
    Command(String),
}

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("failed to execute key command: {0}")]
    Command(String),
    #[error("key command timed out")]
    Timeout,
    #[error("key command returned empty key")]
    EmptyKey,
}

impl ApiKeySource {
    /// Build a source from optional static and command settings. The command
    /// wins when both are present.
    pub fn from_settings(key: Option<String>, key_command: Option<String>) -> Self {
        match (key_command, key) {
            (Some(cmd), _) => ApiKeySource::Command(cmd),
            (None, Some(key)) => ApiKeySource::Static(key),
            (None, None) => ApiKeySource::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ApiKeySource::None)
    }

    /// Get the current key, executing the command if necessary.
    pub async fn get_key(&self) -> Result<Option<String>, ApiKeyError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "key command failed to execute");
                        return Err(ApiKeyError::Command(e.to_string()));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "key command timed out");
                        return Err(ApiKeyError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "key command failed");
                    return Err(ApiKeyError::Command(format!(
                        "key command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    warn!(command = %cmd, "key command returned empty key");
                    return Err(ApiKeyError::EmptyKey);
                }

                Ok(Some(key))
            }
        }
    }
}
