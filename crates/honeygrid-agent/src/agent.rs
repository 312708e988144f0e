// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Agent supervisor.
//!
//! Starts one listener task per configured port and idles until the process is interrupted.
//! Listener and handler tasks are never joined; shutdown cancels the accept loops and abandons
//! whatever handlers are still in flight.

use crate::backup::BackupSink;
use crate::collector::{CollectorClient, EventForwarder};
use crate::config::AgentConfig;
use crate::errors::CollectorError;
use crate::listener::start_listener;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const IDLE_INTERVAL: Duration = Duration::from_secs(5);

/// Why [`Agent::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    UserInterrupt,
    Cancelled,
    SignalError,
}

pub struct Agent {
    config: Arc<AgentConfig>,
    forwarder: Arc<dyn EventForwarder + Send + Sync>,
}

impl Agent {
    /// Builds the agent with a [`CollectorClient`] for the configured endpoint.
    pub fn new(config: Arc<AgentConfig>) -> Result<Self, CollectorError> {
        let backup = Arc::new(BackupSink::new(config.backup_path.clone()));
        let collector = CollectorClient::new(
            config.api_endpoint.clone(),
            config.collector_timeout(),
            backup,
        )?;
        Ok(Self::with_forwarder(config, Arc::new(collector)))
    }

    #[must_use]
    pub fn with_forwarder(
        config: Arc<AgentConfig>,
        forwarder: Arc<dyn EventForwarder + Send + Sync>,
    ) -> Self {
        Agent { config, forwarder }
    }

    /// Spawns one listener per configured port. A port that fails to bind does not affect the
    /// others.
    pub fn start_listeners(&self, cancel_token: &CancellationToken) {
        for &port in &self.config.ports {
            let forwarder = Arc::clone(&self.forwarder);
            let cancel_token = cancel_token.clone();
            tokio::spawn(async move {
                start_listener(port, forwarder, cancel_token).await;
            });
        }
    }

    /// Runs until Ctrl+C or until `shutdown` is cancelled, then cancels every listener.
    pub async fn run(self, shutdown: CancellationToken) -> ShutdownReason {
        info!("=== Honeygrid Agent Started ===");
        debug!(
            "Forwarding events to {} for ports {:?}",
            self.config.api_endpoint, self.config.ports
        );

        let listeners_token = shutdown.child_token();
        self.start_listeners(&listeners_token);

        let mut idle = interval(IDLE_INTERVAL);
        idle.tick().await; // first tick is instantaneous

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let reason = loop {
            tokio::select! {
                _ = idle.tick() => {}
                () = shutdown.cancelled() => break ShutdownReason::Cancelled,
                result = &mut ctrl_c => {
                    break match result {
                        Ok(()) => ShutdownReason::UserInterrupt,
                        Err(e) => {
                            error!("Failed to listen for Ctrl+C: {e}");
                            ShutdownReason::SignalError
                        }
                    };
                }
            }
        };

        info!("Shutting down agent...");
        listeners_token.cancel();
        reason
    }
}
