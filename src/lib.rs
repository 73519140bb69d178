//! Inbound listener lifecycle manager for a local proxy.
//!
//! Keeps the HTTP, SOCKS (TCP and UDP) and redirect front-ends bound to the
//! addresses the configuration asks for, rebinding only what changed.

pub mod admin;
pub mod config;
pub mod inbound;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use inbound::{FrontEndKind, InboundController, ListenerRegistry, Ports};
pub use lifecycle::Shutdown;
