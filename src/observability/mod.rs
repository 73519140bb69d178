//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / net / admin
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (listener gauges, reconfigure counters)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
