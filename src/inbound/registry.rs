//! Registry of live front-end listeners.
//!
//! # Responsibilities
//! - Hold at most one live handle per front-end kind
//! - Converge each kind to its desired address with the fewest close/create steps
//! - Rebind the SOCKS UDP relay whenever the SOCKS TCP listener changes
//! - Answer port and bind-address queries from the live handles
//!
//! # Slot transitions
//! ```text
//! Empty → Bound            create succeeded
//! Bound → Bound            same address, nothing touched
//! Bound → Empty → Bound    address changed
//! Bound → Empty            disabled (port 0)
//! ```
//!
//! # Design Decisions
//! - One async mutex over all four slots, held across close and create
//! - A failed create leaves the slot empty, never half-built
//! - A UDP failure is reported but never unbinds the TCP listener

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::InboundConfig;
use crate::inbound::address::{self, BindSpec};
use crate::inbound::error::{ApplyError, ListenerError};
use crate::inbound::handle::{ListenerFactory, ListenerHandle};
use crate::inbound::kind::FrontEndKind;
use crate::observability::metrics;

/// One factory per front-end kind.
#[derive(Clone)]
pub struct Factories {
    pub http: Arc<dyn ListenerFactory>,
    pub socks_tcp: Arc<dyn ListenerFactory>,
    pub socks_udp: Arc<dyn ListenerFactory>,
    pub redirect: Arc<dyn ListenerFactory>,
}

impl Factories {
    fn get(&self, kind: FrontEndKind) -> &dyn ListenerFactory {
        match kind {
            FrontEndKind::Http => self.http.as_ref(),
            FrontEndKind::SocksTcp => self.socks_tcp.as_ref(),
            FrontEndKind::SocksUdp => self.socks_udp.as_ref(),
            FrontEndKind::Redirect => self.redirect.as_ref(),
        }
    }
}

type Slot = Option<Box<dyn ListenerHandle>>;

#[derive(Default)]
struct ListenerSet {
    http: Slot,
    socks_tcp: Slot,
    socks_udp: Slot,
    redirect: Slot,
}

impl ListenerSet {
    fn slot(&self, kind: FrontEndKind) -> &Slot {
        match kind {
            FrontEndKind::Http => &self.http,
            FrontEndKind::SocksTcp => &self.socks_tcp,
            FrontEndKind::SocksUdp => &self.socks_udp,
            FrontEndKind::Redirect => &self.redirect,
        }
    }

    fn slot_mut(&mut self, kind: FrontEndKind) -> &mut Slot {
        match kind {
            FrontEndKind::Http => &mut self.http,
            FrontEndKind::SocksTcp => &mut self.socks_tcp,
            FrontEndKind::SocksUdp => &mut self.socks_udp,
            FrontEndKind::Redirect => &mut self.redirect,
        }
    }

    fn port(&self, kind: FrontEndKind) -> u16 {
        self.slot(kind)
            .as_ref()
            .map(|handle| address::port_of(handle.address()))
            .unwrap_or(0)
    }
}

/// Ports currently served, zero for a front-end that is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ports {
    pub port: u16,
    #[serde(rename = "socks-port")]
    pub socks_port: u16,
    #[serde(rename = "redir-port")]
    pub redir_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Unchanged,
    Bound,
    Disabled,
}

/// Live listeners, one slot per [`FrontEndKind`].
pub struct ListenerRegistry {
    factories: Factories,
    slots: Mutex<ListenerSet>,
}

impl ListenerRegistry {
    /// Create an empty registry. Nothing is bound until the first reconfigure.
    pub fn new(factories: Factories) -> Self {
        Self {
            factories,
            slots: Mutex::new(ListenerSet::default()),
        }
    }

    /// Converge one front-end to the address described by `spec`.
    ///
    /// Reconfiguring `SocksTcp` also drives `SocksUdp` to the same address
    /// whenever the TCP slot changed. A UDP error is returned, but the TCP
    /// listener stays bound.
    pub async fn reconfigure(
        &self,
        kind: FrontEndKind,
        spec: BindSpec<'_>,
    ) -> Result<(), ListenerError> {
        let desired = spec.resolve();
        let mut slots = self.slots.lock().await;

        let transition = self.converge(&mut slots, kind, &desired).await?;

        // An unchanged TCP slot leaves UDP as is, even if UDP is empty.
        if kind == FrontEndKind::SocksTcp && transition != Transition::Unchanged {
            self.converge(&mut slots, FrontEndKind::SocksUdp, &desired)
                .await?;
        }

        Ok(())
    }

    pub async fn reconfigure_http(
        &self,
        host: &str,
        port: u16,
        allow_lan: bool,
    ) -> Result<(), ListenerError> {
        self.reconfigure(FrontEndKind::Http, BindSpec::new(host, port, allow_lan))
            .await
    }

    pub async fn reconfigure_socks(
        &self,
        host: &str,
        port: u16,
        allow_lan: bool,
    ) -> Result<(), ListenerError> {
        self.reconfigure(FrontEndKind::SocksTcp, BindSpec::new(host, port, allow_lan))
            .await
    }

    pub async fn reconfigure_redirect(
        &self,
        host: &str,
        port: u16,
        allow_lan: bool,
    ) -> Result<(), ListenerError> {
        self.reconfigure(FrontEndKind::Redirect, BindSpec::new(host, port, allow_lan))
            .await
    }

    /// Apply a whole inbound section.
    ///
    /// Every front-end is attempted; failures are collected rather than
    /// short-circuiting.
    pub async fn apply(&self, settings: &InboundConfig) -> Result<(), ApplyError> {
        let host = settings.bind_address.as_str();
        let lan = settings.allow_lan;

        let results = [
            self.reconfigure_http(host, settings.port, lan).await,
            self.reconfigure_socks(host, settings.socks_port, lan).await,
            self.reconfigure_redirect(host, settings.redir_port, lan).await,
        ];

        let failures: Vec<ListenerError> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApplyError { failures })
        }
    }

    /// Ports of the HTTP, SOCKS and redirect front-ends.
    pub async fn ports(&self) -> Ports {
        let slots = self.slots.lock().await;
        Ports {
            port: slots.port(FrontEndKind::Http),
            socks_port: slots.port(FrontEndKind::SocksTcp),
            redir_port: slots.port(FrontEndKind::Redirect),
        }
    }

    /// Host of the first bound front-end in HTTP, SOCKS, redirect order.
    ///
    /// Empty when none is bound, and also for a wildcard bind.
    pub async fn bind_address(&self) -> String {
        let slots = self.slots.lock().await;
        FrontEndKind::QUERY_ORDER
            .iter()
            .find_map(|kind| slots.slot(*kind).as_ref())
            .map(|handle| address::host_of(handle.address()).to_string())
            .unwrap_or_default()
    }

    /// Address of the handle in `kind`'s slot, if any.
    pub async fn address(&self, kind: FrontEndKind) -> Option<String> {
        let slots = self.slots.lock().await;
        slots
            .slot(kind)
            .as_ref()
            .map(|handle| handle.address().to_string())
    }

    pub async fn is_bound(&self, kind: FrontEndKind) -> bool {
        self.slots.lock().await.slot(kind).is_some()
    }

    /// Close every live listener. Used on shutdown.
    pub async fn close_all(&self) {
        let mut slots = self.slots.lock().await;
        for kind in FrontEndKind::ALL {
            if let Some(handle) = slots.slot_mut(kind).take() {
                close_handle(kind, handle).await;
            }
        }
    }

    async fn converge(
        &self,
        slots: &mut ListenerSet,
        kind: FrontEndKind,
        desired: &str,
    ) -> Result<Transition, ListenerError> {
        let slot = slots.slot_mut(kind);

        if slot.as_ref().is_some_and(|handle| handle.address() == desired) {
            tracing::debug!(kind = %kind, address = %desired, "Listener unchanged");
            metrics::record_reconfigure(kind, "unchanged");
            return Ok(Transition::Unchanged);
        }

        if let Some(handle) = slot.take() {
            close_handle(kind, handle).await;
        }

        if address::is_disabled(desired) {
            tracing::info!(kind = %kind, "Listener disabled");
            metrics::record_reconfigure(kind, "disabled");
            return Ok(Transition::Disabled);
        }

        match self.factories.get(kind).create(desired).await {
            Ok(handle) => {
                tracing::info!(kind = %kind, address = %desired, "Listener bound");
                *slot = Some(handle);
                metrics::record_listener_bound(kind, true);
                metrics::record_reconfigure(kind, "bound");
                Ok(Transition::Bound)
            }
            Err(e) => {
                tracing::error!(kind = %kind, address = %desired, error = %e, "Failed to bind listener");
                metrics::record_reconfigure(kind, "failed");
                Err(e)
            }
        }
    }
}

async fn close_handle(kind: FrontEndKind, handle: Box<dyn ListenerHandle>) {
    let address = handle.address().to_string();
    handle.close().await;
    metrics::record_listener_bound(kind, false);
    tracing::info!(kind = %kind, address = %address, "Listener closed");
}
