//! Local development server: alias rewrites, upstream proxy rules and a
//! static passthrough, resolved per request path.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::DevServer;
pub use lifecycle::Shutdown;
pub use routing::{Action, DevServerRouter};
