//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch)
//!     → routing::DevServerRouter::resolve(path)
//!         Rewrite     → static_files.rs (ServeDir under alias replacement)
//!         Forward     → forward.rs (upstream client, Host rewrite)
//!         Passthrough → static_files.rs (static root or 404)
//!     → response.rs (gateway failures → 502/504)
//!     → Send to client
//! ```

pub mod forward;
pub mod response;
pub mod server;
pub mod static_files;

pub use forward::UpstreamClient;
pub use response::{GatewayError, X_DEVPROXY_ERROR};
pub use server::DevServer;
