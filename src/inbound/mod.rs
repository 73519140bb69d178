//! Inbound listener lifecycle.
//!
//! # Data Flow
//! ```text
//! config reload / admin PATCH
//!     → registry.rs (reconfigure per kind, SOCKS UDP cascade)
//!     → address.rs (resolve host/port/allow_lan, detect disabled)
//!     → handle.rs (factory create, handle close)
//!
//! status / admin GET
//!     → registry.rs (ports, bind_address)
//!
//! controller.rs pairs the registry with the settings it last applied.
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit value shared through `Arc`, not a global
//! - All four kinds share one reconfigure routine keyed by `FrontEndKind`
//! - Protocol serving lives behind `ListenerFactory`; see `crate::net`

pub mod address;
pub mod controller;
pub mod error;
pub mod handle;
pub mod kind;
pub mod registry;

pub use address::{is_disabled, resolve_address, BindSpec};
pub use controller::{InboundController, UpdateError};
pub use error::{ApplyError, ListenerError};
pub use handle::{ListenerFactory, ListenerHandle};
pub use kind::FrontEndKind;
pub use registry::{Factories, ListenerRegistry, Ports};
