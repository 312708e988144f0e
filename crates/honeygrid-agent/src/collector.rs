// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of captured records to the remote collector.
//!
//! Each record is POSTed as JSON exactly once. Only transport failures (timeout, refused
//! connection, DNS) fall back to the [`BackupSink`]. A non-200 answer is logged as a warning and
//! nothing is written locally.

use crate::backup::BackupSink;
use crate::errors::CollectorError;
use crate::event::EventRecord;
use crate::http_utils::build_client;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What happened to a record handed to a forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Collector answered 200.
    Delivered,
    /// Collector answered with another status. The record is not backed up.
    Rejected(StatusCode),
    /// Collector was unreachable and the record was appended to the backup file.
    BackedUp,
    /// Collector was unreachable and the backup write failed too.
    Lost,
}

#[async_trait]
pub trait EventForwarder {
    async fn forward(&self, record: EventRecord) -> DeliveryOutcome;
}

pub struct CollectorClient {
    endpoint: String,
    client: reqwest::Client,
    backup: Arc<BackupSink>,
}

impl CollectorClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        backup: Arc<BackupSink>,
    ) -> Result<Self, CollectorError> {
        Ok(CollectorClient {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
            backup,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fall_back(&self, record: &EventRecord) -> DeliveryOutcome {
        match self.backup.append(record).await {
            Ok(()) => DeliveryOutcome::BackedUp,
            Err(e) => {
                error!(
                    "Failed to back up event from {}:{}: {e}. Event dropped",
                    record.source_ip, record.source_port
                );
                DeliveryOutcome::Lost
            }
        }
    }
}

#[async_trait]
impl EventForwarder for CollectorClient {
    async fn forward(&self, record: EventRecord) -> DeliveryOutcome {
        let time = Instant::now();
        let response = self.client.post(&self.endpoint).json(&record).send().await;
        let elapsed = time.elapsed();

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::OK {
                    info!("[OK] Event sent to collector.");
                    debug!("Collector accepted event in {} ms", elapsed.as_millis());
                    DeliveryOutcome::Delivered
                } else {
                    warn!("[!] Collector responded with {}", status.as_u16());
                    DeliveryOutcome::Rejected(status)
                }
            }
            Err(e) => {
                error!("[x] Failed to send data to collector: {e}");
                self.fall_back(&record).await
            }
        }
    }
}
