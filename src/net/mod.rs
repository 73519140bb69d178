//! Socket-level front-ends.
//!
//! # Data Flow
//! ```text
//! ListenerRegistry
//!     → TcpFactory / UdpFactory::create(address)
//!     → resolve_bind_addr (wildcard → 0.0.0.0, DNS lookup)
//!     → bind socket, spawn serve task
//!     → ServeHandle returned to the registry
//!
//! Serve task:
//!     tcp.rs: permit → accept → ConnectionHandler
//!     udp.rs: recv_from → PacketHandler
//!
//! ServeHandle::close:
//!     stop signal → task exits and drops the socket → close returns
//! ```
//!
//! # Design Decisions
//! - Protocol logic is injected through handler traits
//! - The handle keeps the requested address string, not the OS-resolved one,
//!   so `":7890"` stays comparable with the next desired address
//! - Dropping a handle without closing it also stops the task

use std::io;
use std::net::SocketAddr;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::inbound::address;
use crate::inbound::{FrontEndKind, ListenerError, ListenerHandle};

pub mod tcp;
pub mod udp;

pub use tcp::TcpFactory;
pub use udp::UdpFactory;

/// Serves one accepted TCP connection.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) -> BoxFuture<'static, io::Result<()>>;
}

/// Serves one received datagram.
pub trait PacketHandler: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        socket: &'a UdpSocket,
        packet: &'a [u8],
        peer: SocketAddr,
    ) -> BoxFuture<'a, io::Result<()>>;
}

/// Handler that logs and drops everything it receives.
///
/// Placeholder for front-ends whose protocol is not wired in.
#[derive(Debug, Clone, Copy)]
pub struct LoggingHandler {
    pub kind: FrontEndKind,
}

impl ConnectionHandler for LoggingHandler {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) -> BoxFuture<'static, io::Result<()>> {
        let kind = self.kind;
        async move {
            tracing::debug!(kind = %kind, peer = %peer, "No protocol handler, dropping connection");
            drop(stream);
            Ok(())
        }
        .boxed()
    }
}

impl PacketHandler for LoggingHandler {
    fn handle<'a>(
        &'a self,
        _socket: &'a UdpSocket,
        packet: &'a [u8],
        peer: SocketAddr,
    ) -> BoxFuture<'a, io::Result<()>> {
        tracing::debug!(kind = %self.kind, peer = %peer, len = packet.len(), "No protocol handler, dropping datagram");
        async { Ok(()) }.boxed()
    }
}

/// Resolve a `host:port` string to the socket address to bind.
pub(crate) async fn resolve_bind_addr(addr: &str) -> Result<SocketAddr, ListenerError> {
    let (host, port) = address::bind_target(addr)?;
    let resolution_error = |reason: String| ListenerError::AddressResolution {
        address: addr.to_string(),
        reason,
    };

    let mut candidates = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| resolution_error(e.to_string()))?;

    candidates
        .next()
        .ok_or_else(|| resolution_error(format!("`{host}` resolved to no addresses")))
}

pub(crate) fn bind_error(kind: FrontEndKind, address: &str, source: io::Error) -> ListenerError {
    ListenerError::Bind {
        kind,
        address: address.to_string(),
        source,
    }
}

/// Handle over a running serve task.
pub struct ServeHandle {
    kind: FrontEndKind,
    address: String,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServeHandle {
    pub(crate) fn new(
        kind: FrontEndKind,
        address: &str,
        stop: watch::Sender<bool>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            kind,
            address: address.to_string(),
            stop,
            task,
        }
    }
}

impl ListenerHandle for ServeHandle {
    fn address(&self) -> &str {
        &self.address
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        let ServeHandle {
            kind,
            address,
            stop,
            task,
        } = *self;

        async move {
            // The task may already be gone; nothing to signal then.
            let _ = stop.send(true);
            if let Err(e) = task.await {
                tracing::warn!(kind = %kind, address = %address, error = %e, "Serve task ended abnormally");
            }
        }
        .boxed()
    }
}
