//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs: alias table (longest prefix)  → Rewrite
//!     → router.rs: proxy table (longest prefix)  → Forward
//!     → otherwise                                → Passthrough
//!
//! Route Compilation (at startup):
//!     ServerConfig.aliases / proxy_rules
//!     → matcher.rs PrefixTable (sorted longest first)
//!     → Freeze as immutable DevServerRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves the same way

pub mod matcher;
pub mod router;

pub use router::{Action, DevServerRouter, Forward, Rewrite};
