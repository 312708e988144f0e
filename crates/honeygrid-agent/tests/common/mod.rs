// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the capture pipeline integration tests

use honeygrid_agent::backup::BackupSink;
use honeygrid_agent::collector::CollectorClient;
use honeygrid_agent::listener::PortListener;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("Failed to get local addr").port()
}

/// Starts a listener on an OS-assigned port that forwards to `endpoint`, backing up to
/// `backup_path`. Returns the bound port.
pub fn start_pipeline(
    endpoint: String,
    backup_path: &Path,
    cancel_token: &CancellationToken,
) -> u16 {
    let backup = Arc::new(BackupSink::new(backup_path));
    let collector = CollectorClient::new(endpoint, Duration::from_secs(5), backup)
        .expect("Failed to create collector client");
    let listener = PortListener::bind(0).expect("Failed to bind listener");
    let port = listener.port();
    tokio::spawn(listener.serve(Arc::new(collector), cancel_token.clone()));
    port
}

pub async fn connect(port: u16) -> TcpStream {
    TcpStream::connect(("127.0.0.1", port))
        .await
        .expect("Failed to connect to listener")
}

/// Polls `path` until it holds `expected` lines or `wait` elapses, then returns its lines.
pub async fn wait_for_lines(path: &Path, expected: usize, wait: Duration) -> Vec<String> {
    let start = tokio::time::Instant::now();
    loop {
        let lines: Vec<String> = std::fs::read_to_string(path)
            .map(|contents| contents.lines().map(str::to_string).collect())
            .unwrap_or_default();
        if lines.len() >= expected || start.elapsed() >= wait {
            return lines;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
