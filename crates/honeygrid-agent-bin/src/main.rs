// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use honeygrid_agent::{agent::Agent, config::AgentConfig, logger};

#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match AgentConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            logger::log_startup_error(&format!(
                "Error loading honeygrid agent configuration: {e}"
            ));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&config.log_level, &config.log_file) {
        logger::log_startup_error(&format!("Error setting up logging: {e}"));
        return ExitCode::FAILURE;
    }
    debug!("Logging subsystem enabled");

    let agent = match Agent::new(Arc::clone(&config)) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Error creating honeygrid agent: {e}");
            return ExitCode::FAILURE;
        }
    };

    let reason = agent.run(CancellationToken::new()).await;
    info!("Agent stopped: {reason:?}");
    ExitCode::SUCCESS
}
