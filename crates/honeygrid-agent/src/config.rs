// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Agent configuration.
//!
//! The configuration is a YAML document loaded once at startup:
//!
//! ```yaml
//! api_endpoint: http://collector.internal:8000/api/v1/ingest
//! ports: [22, 80, 445]
//! ```
//!
//! Every key is optional. A missing or unparsable document is a startup error.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000/api/v1/ingest";
pub const DEFAULT_PORTS: [i64; 3] = [22, 80, 445];
pub const DEFAULT_BACKUP_PATH: &str = "unsent_logs.json";
pub const DEFAULT_LOG_FILE: &str = "honeygrid_agent.log";
pub const DEFAULT_COLLECTOR_TIMEOUT_SECS: u64 = 5;

const CONFIG_PATH_ENV: &str = "HONEYGRID_CONFIG";
const LOG_LEVEL_ENV: &str = "HONEYGRID_LOG_LEVEL";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Collector URL that receives one JSON document per captured connection
    pub api_endpoint: String,
    /// Ports to listen on, in order. Out-of-range values fail only their own listener.
    pub ports: Vec<i64>,
    /// Newline-delimited JSON file for records the collector could not receive
    pub backup_path: PathBuf,
    /// File that mirrors the process log output
    pub log_file: PathBuf,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Timeout applied to each collector request
    pub collector_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            backup_path: PathBuf::from(DEFAULT_BACKUP_PATH),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: "info".to_string(),
            collector_timeout_secs: DEFAULT_COLLECTOR_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Loads the document named by `HONEYGRID_CONFIG` (default `config.yaml`) and applies the
    /// `HONEYGRID_LOG_LEVEL` override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(path)?;

        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            config.log_level = level.trim().to_lowercase();
            config.validate()?;
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        // An empty document parses as null; treat it like an empty mapping.
        let config: AgentConfig = if contents.trim().is_empty() {
            AgentConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.api_endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "api_endpoint cannot be empty".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_endpoint '{endpoint}' must be an http or https URL"
            )));
        }

        if self.collector_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "collector_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs)
    }
}
