// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One TCP accept loop per configured port.

use crate::collector::EventForwarder;
use crate::errors::ListenerError;
use crate::handler::handle_connection;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const LISTEN_BACKLOG: u32 = 10;
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct PortListener {
    listener: TcpListener,
    port: u16,
}

impl PortListener {
    /// Binds `port` on all IPv4 interfaces with `SO_REUSEADDR`.
    ///
    /// Port 0 asks the OS for a free port; [`PortListener::port`] reports the one assigned.
    pub fn bind(port: i64) -> Result<Self, ListenerError> {
        let requested = u16::try_from(port).map_err(|_| ListenerError::InvalidPort(port))?;
        let bind_err = |source: std::io::Error| ListenerError::Bind {
            port: requested,
            source,
        };

        let socket = TcpSocket::new_v4().map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket
            .bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, requested)))
            .map_err(bind_err)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        let port = listener.local_addr().map_err(bind_err)?.port();

        Ok(PortListener { listener, port })
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accepts connections until `cancel_token` is cancelled.
    ///
    /// Every connection is handled on its own detached task. Accept errors are logged and retried
    /// after [`ACCEPT_RETRY_DELAY`].
    pub async fn serve(
        self,
        forwarder: Arc<dyn EventForwarder + Send + Sync>,
        cancel_token: CancellationToken,
    ) {
        let port = self.port;
        loop {
            let accepted = tokio::select! {
                () = cancel_token.cancelled() => {
                    debug!("Listener on port {port} stopped");
                    return;
                }
                res = self.listener.accept() => res,
            };

            match accepted {
                Ok((stream, peer)) => {
                    let forwarder = Arc::clone(&forwarder);
                    tokio::spawn(async move {
                        handle_connection(stream, peer, port, forwarder).await;
                    });
                }
                Err(e) => {
                    error!("Socket error on port {port}: {e}");
                    tokio::select! {
                        () = cancel_token.cancelled() => return,
                        () = sleep(ACCEPT_RETRY_DELAY) => {}
                    }
                }
            }
        }
    }
}

/// Binds and serves one port. A bind failure is logged and ends only this listener.
pub async fn start_listener(
    port: i64,
    forwarder: Arc<dyn EventForwarder + Send + Sync>,
    cancel_token: CancellationToken,
) {
    let listener = match PortListener::bind(port) {
        Ok(listener) => listener,
        Err(e) => {
            error!("{e}");
            return;
        }
    };
    info!("[*] Listening on port {}", listener.port());
    listener.serve(forwarder, cancel_token).await;
}
