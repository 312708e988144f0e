// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::net::SocketAddr;

/// One captured connection, as shipped to the collector and written to the backup log.
///
/// Field names are part of the collector contract and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub payload: String,
}

impl EventRecord {
    /// Builds a record stamped with the current UTC time.
    ///
    /// `data` is decoded lossily: invalid UTF-8 sequences become U+FFFD and never fail.
    /// Surrounding whitespace is trimmed, so an empty read yields an empty payload.
    #[must_use]
    pub fn capture(peer: SocketAddr, destination_port: u16, data: &[u8]) -> Self {
        Self::new(Utc::now(), peer, destination_port, data)
    }

    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        peer: SocketAddr,
        destination_port: u16,
        data: &[u8],
    ) -> Self {
        EventRecord {
            timestamp,
            source_ip: peer.ip().to_string(),
            source_port: peer.port(),
            destination_port,
            payload: decode_payload(data),
        }
    }
}

fn decode_payload(data: &[u8]) -> String {
    String::from_utf8_lossy(data).trim().to_string()
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
}
