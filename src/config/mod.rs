//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → update sent over mpsc
//!     → registry applies [inbound], admin state swaps settings
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - An invalid reload is logged and dropped; the running config stays

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, InboundConfig, LimitsConfig, ObservabilityConfig, ProxyConfig};
pub use watcher::ConfigWatcher;
