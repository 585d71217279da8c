//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch / forward / startup produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when configured
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
