// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors raised while loading the agent configuration. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that stop a single port listener. Other listeners are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Invalid port {0}: must be between 0 and 65535")]
    InvalidPort(i64),

    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Errors writing a record to the local backup log.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to open backup file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write backup file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors creating the collector client.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::Invalid("api_endpoint cannot be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: api_endpoint cannot be empty"
        );

        let error = ListenerError::InvalidPort(99999);
        assert_eq!(
            error.to_string(),
            "Invalid port 99999: must be between 0 and 65535"
        );
    }

    #[test]
    fn test_bind_error_mentions_port() {
        let error = ListenerError::Bind {
            port: 445,
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(error.to_string().starts_with("Failed to bind port 445"));
    }
}
