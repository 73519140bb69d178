//! UDP relay front-end.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::Instrument;

use crate::inbound::{FrontEndKind, ListenerError, ListenerFactory, ListenerHandle};
use crate::net::{bind_error, resolve_bind_addr, PacketHandler, ServeHandle};

/// Largest datagram accepted by the relay.
const MAX_DATAGRAM: usize = 64 * 1024;

/// Binds UDP sockets for one front-end kind.
pub struct UdpFactory {
    kind: FrontEndKind,
    handler: Arc<dyn PacketHandler>,
}

impl UdpFactory {
    pub fn new(kind: FrontEndKind, handler: Arc<dyn PacketHandler>) -> Self {
        Self { kind, handler }
    }
}

impl ListenerFactory for UdpFactory {
    fn create<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn ListenerHandle>, ListenerError>> {
        async move {
            let addr = resolve_bind_addr(address).await?;
            let socket = UdpSocket::bind(addr)
                .await
                .map_err(|e| bind_error(self.kind, address, e))?;
            let local_addr = socket
                .local_addr()
                .map_err(|e| bind_error(self.kind, address, e))?;

            tracing::info!(
                kind = %self.kind,
                address = %address,
                local_addr = %local_addr,
                "UDP front-end listening"
            );

            let (stop_tx, stop_rx) = watch::channel(false);
            let task = tokio::spawn(
                recv_loop(socket, Arc::clone(&self.handler), stop_rx)
                    .instrument(tracing::info_span!("relay", kind = %self.kind, local = %local_addr)),
            );

            let handle: Box<dyn ListenerHandle> =
                Box::new(ServeHandle::new(self.kind, address, stop_tx, task));
            Ok(handle)
        }
        .boxed()
    }
}

async fn recv_loop(
    socket: UdpSocket,
    handler: Arc<dyn PacketHandler>,
    mut stop: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let (len, peer) = tokio::select! {
            _ = stop.changed() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    // ICMP errors from earlier sends surface here; keep serving.
                    tracing::debug!(error = %e, "Receive error");
                    continue;
                }
            },
        };

        if let Err(e) = handler.handle(&socket, &buf[..len], peer).await {
            tracing::debug!(peer = %peer, error = %e, "Datagram handling failed");
        }
    }

    drop(socket);
    tracing::debug!("Relay loop stopped");
}
