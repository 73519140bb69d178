//! Startup orchestration.
//!
//! # Responsibilities
//! - Build one factory per front-end kind from the configured limits
//! - Construct the registry every other subsystem shares
//! - Apply the initial inbound settings
//!
//! # Design Decisions
//! - A front-end that fails to bind at startup is logged, not fatal; the
//!   next reload or admin change can bring it up

use std::sync::Arc;

use crate::config::{LimitsConfig, ProxyConfig};
use crate::inbound::{Factories, FrontEndKind, ListenerRegistry};
use crate::net::{LoggingHandler, TcpFactory, UdpFactory};

/// Factories backed by real sockets and the logging placeholder handler.
pub fn default_factories(limits: &LimitsConfig) -> Factories {
    let tcp = |kind| {
        Arc::new(TcpFactory::new(
            kind,
            Arc::new(LoggingHandler { kind }),
            limits.max_connections,
        ))
    };

    Factories {
        http: tcp(FrontEndKind::Http),
        socks_tcp: tcp(FrontEndKind::SocksTcp),
        socks_udp: Arc::new(UdpFactory::new(
            FrontEndKind::SocksUdp,
            Arc::new(LoggingHandler {
                kind: FrontEndKind::SocksUdp,
            }),
        )),
        redirect: tcp(FrontEndKind::Redirect),
    }
}

/// Build the registry and bring up the configured front-ends.
pub async fn start(config: &ProxyConfig, factories: Factories) -> Arc<ListenerRegistry> {
    let registry = Arc::new(ListenerRegistry::new(factories));

    match registry.apply(&config.inbound).await {
        Ok(()) => {
            let ports = registry.ports().await;
            tracing::info!(
                port = ports.port,
                socks_port = ports.socks_port,
                redir_port = ports.redir_port,
                allow_lan = config.inbound.allow_lan,
                "Inbound listeners started"
            );
        }
        Err(e) => {
            for failure in &e.failures {
                tracing::error!(error = %failure, "Front-end failed to start");
            }
        }
    }

    registry
}
