//! TCP front-end with backpressure.
//!
//! # Responsibilities
//! - Bind the requested address
//! - Accept connections until told to stop
//! - Enforce max_connections via semaphore
//! - Survive transient accept errors

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::{watch, Semaphore};
use tracing::Instrument;

use crate::inbound::{FrontEndKind, ListenerError, ListenerFactory, ListenerHandle};
use crate::net::{bind_error, resolve_bind_addr, ConnectionHandler, ServeHandle};

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Binds TCP listeners for one front-end kind.
pub struct TcpFactory {
    kind: FrontEndKind,
    handler: Arc<dyn ConnectionHandler>,
    max_connections: usize,
}

impl TcpFactory {
    pub fn new(
        kind: FrontEndKind,
        handler: Arc<dyn ConnectionHandler>,
        max_connections: usize,
    ) -> Self {
        Self {
            kind,
            handler,
            max_connections,
        }
    }
}

impl ListenerFactory for TcpFactory {
    fn create<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn ListenerHandle>, ListenerError>> {
        async move {
            let addr = resolve_bind_addr(address).await?;
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| bind_error(self.kind, address, e))?;
            let local_addr = listener
                .local_addr()
                .map_err(|e| bind_error(self.kind, address, e))?;

            tracing::info!(
                kind = %self.kind,
                address = %address,
                local_addr = %local_addr,
                max_connections = self.max_connections,
                "TCP front-end listening"
            );

            let (stop_tx, stop_rx) = watch::channel(false);
            let task = tokio::spawn(
                accept_loop(
                    self.kind,
                    listener,
                    Arc::clone(&self.handler),
                    Arc::new(Semaphore::new(self.max_connections)),
                    stop_rx,
                )
                .instrument(tracing::info_span!("listener", kind = %self.kind, local = %local_addr)),
            );

            let handle: Box<dyn ListenerHandle> =
                Box::new(ServeHandle::new(self.kind, address, stop_tx, task));
            Ok(handle)
        }
        .boxed()
    }
}

async fn accept_loop(
    kind: FrontEndKind,
    listener: TcpListener,
    handler: Arc<dyn ConnectionHandler>,
    connection_limit: Arc<Semaphore>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        // Acquire permit first (backpressure)
        let permit = tokio::select! {
            _ = stop.changed() => break,
            permit = Arc::clone(&connection_limit).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let (stream, peer) = tokio::select! {
            _ = stop.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(error = %e, "Accept error");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            },
        };

        tracing::debug!(
            peer_addr = %peer,
            available_permits = connection_limit.available_permits(),
            "Connection accepted"
        );

        let handler = Arc::clone(&handler);
        tokio::spawn(
            async move {
                if let Err(e) = handler.handle(stream, peer).await {
                    tracing::debug!(error = %e, "Connection error");
                }
                drop(permit);
            }
            .instrument(tracing::info_span!("connection", kind = %kind, peer = %peer)),
        );
    }

    // Listener drops here, releasing the port before the task completes.
    drop(listener);
    tracing::debug!("Accept loop stopped");
}
