// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::CollectorError;
use core::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

const AGENT_USER_AGENT: &str = concat!("honeygrid-agent/", env!("CARGO_PKG_VERSION"));

/// Builds the reqwest client used to reach the collector.
///
/// `timeout` bounds each request from connect to the end of the response body.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CollectorError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(AGENT_USER_AGENT));

    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| CollectorError::Client(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(AGENT_USER_AGENT.starts_with("honeygrid-agent/"));
    }
}
