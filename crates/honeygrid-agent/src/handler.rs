// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-connection capture.
//!
//! A handler performs exactly one read of at most [`READ_BUFFER_SIZE`] bytes, turns it into an
//! [`EventRecord`] and hands it to the forwarder. There is no protocol emulation and no read
//! deadline: a silent peer keeps its handler parked on the read until the transport gives up.

use crate::collector::{DeliveryOutcome, EventForwarder};
use crate::event::EventRecord;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, info_span, Instrument};

pub const READ_BUFFER_SIZE: usize = 2048;

/// Captures one connection and releases it.
///
/// The stream is consumed and closed on every path. Returns `None` when the read failed and no
/// record was built.
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    destination_port: u16,
    forwarder: Arc<dyn EventForwarder + Send + Sync>,
) -> Option<DeliveryOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let span = info_span!("connection", peer = %peer, port = destination_port);
    capture(stream, peer, destination_port, forwarder)
        .instrument(span)
        .await
}

async fn capture<S>(
    mut stream: S,
    peer: SocketAddr,
    destination_port: u16,
    forwarder: Arc<dyn EventForwarder + Send + Sync>,
) -> Option<DeliveryOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let outcome = match stream.read(&mut buf).await {
        Ok(amt) => {
            let record = EventRecord::capture(peer, destination_port, &buf[..amt]);
            info!(
                "[+] Connection from {}:{} on port {}",
                record.source_ip, record.source_port, destination_port
            );
            debug!("Captured {amt} bytes");
            Some(forwarder.forward(record).await)
        }
        Err(e) => {
            error!("Error handling client {peer}: {e}");
            None
        }
    };

    close(stream).await;
    outcome
}

async fn close<S>(mut stream: S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.shutdown().await {
        debug!("Error shutting down connection: {e}");
    }
    drop(stream);
}
