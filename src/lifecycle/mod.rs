//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build factories and registry → Apply [inbound]
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload config from disk
//!
//! Reload (reload.rs):
//!     New config → Re-apply [inbound], retrying front-ends that failed
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Admin server stops → Registry closes every listener → Exit
//! ```

pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use reload::apply_reload;
pub use shutdown::Shutdown;
pub use signals::{Signal, Signals};
