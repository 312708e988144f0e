// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local fallback for records the collector could not receive.
//!
//! Records are appended to a newline-delimited JSON file, one document per line. The file is
//! opened in append mode and closed again for every record; there is no batching or rotation.

use crate::errors::BackupError;
use crate::event::EventRecord;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

pub struct BackupSink {
    path: PathBuf,
    // Held for the whole open/write/close so concurrent handlers never interleave partial lines.
    write_lock: Mutex<()>,
}

impl BackupSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BackupSink {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` as a single JSON line.
    ///
    /// A failure here loses the record; callers log it and move on.
    pub async fn append(&self, record: &EventRecord) -> Result<(), BackupError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| BackupError::Open {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|source| BackupError::Write {
                path: self.path.clone(),
                source,
            })?;
        file.flush().await.map_err(|source| BackupError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!("Appended record to backup file {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;

    fn record(source_port: u16, payload: &[u8]) -> EventRecord {
        let peer: SocketAddr = format!("198.51.100.20:{source_port}").parse().unwrap();
        EventRecord::capture(peer, 80, payload)
    }

    #[tokio::test]
    async fn test_append_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = BackupSink::new(dir.path().join("unsent_logs.json"));

        sink.append(&record(40001, b"first")).await.unwrap();
        sink.append(&record(40002, b"second\nline")).await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["source_port"], 40001);
        assert_eq!(first["payload"], "first");

        // Embedded newlines are escaped by JSON and do not break the line format.
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["payload"], "second\nline");
    }

    #[tokio::test]
    async fn test_append_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsent_logs.json");
        std::fs::write(&path, "{\"existing\":true}\n").unwrap();

        let sink = BackupSink::new(&path);
        sink.append(&record(40003, b"x")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\"existing\":true}\n"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(BackupSink::new(dir.path().join("unsent_logs.json")));
        let payload = "A".repeat(1500);

        let mut handles = Vec::new();
        for i in 0..50u16 {
            let sink = Arc::clone(&sink);
            let payload = payload.clone();
            handles.push(tokio::spawn(async move {
                sink.append(&record(41000 + i, payload.as_bytes()))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let mut ports: Vec<u64> = contents
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                assert_eq!(value["payload"].as_str().unwrap().len(), 1500);
                value["source_port"].as_u64().unwrap()
            })
            .collect();
        ports.sort_unstable();
        assert_eq!(ports, (41000..41050).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = BackupSink::new(dir.path().join("missing-dir").join("unsent_logs.json"));

        let result = sink.append(&record(40004, b"x")).await;
        assert!(matches!(result, Err(BackupError::Open { .. })));
    }
}
