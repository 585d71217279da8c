//! Configuration schema definitions.
//!
//! Two layers live here:
//! - `ConfigFile` and its parts mirror the TOML file one to one and derive Serde.
//! - `ServerConfig`, `AliasRule` and `ProxyRule` are the validated, resolved
//!   values the rest of the crate consumes. They are only produced by
//!   `config::validation::resolve` (or built directly in tests).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable read by the built-in default proxy rule.
pub const DEFAULT_ORIGIN_ENV: &str = "DEVPROXY_API_ORIGIN";

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Interface the dev server binds to.
    pub listen_host: String,

    /// Port the dev server binds to. Kept wide so out-of-range values reach
    /// validation instead of failing inside the TOML parser.
    pub listen_port: i64,

    /// Directory served for requests no rule matches.
    pub static_root: Option<PathBuf>,

    /// Static path rewrite table.
    pub aliases: Vec<AliasEntry>,

    /// Upstream forwarding table.
    pub proxy_rules: Vec<ProxyEntry>,

    /// Timeouts for the forward path.
    pub upstream: UpstreamConfig,

    /// Metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for ConfigFile {
    /// The stock front-end setup: port 3000, `/@` mapped onto `src`, and
    /// `/api` forwarded to the origin named by `DEVPROXY_API_ORIGIN`.
    fn default() -> Self {
        Self {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 3000,
            static_root: None,
            aliases: vec![AliasEntry {
                match_prefix: "/@".to_string(),
                replacement: PathBuf::from("src"),
            }],
            proxy_rules: vec![ProxyEntry {
                match_prefix: "/api".to_string(),
                upstream_origin: None,
                upstream_origin_env: Some(DEFAULT_ORIGIN_ENV.to_string()),
                change_origin: true,
            }],
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// One `[[aliases]]` entry as written in the file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AliasEntry {
    pub match_prefix: String,

    /// Filesystem directory; relative paths resolve against the config file's directory.
    pub replacement: PathBuf,
}

/// One `[[proxy_rules]]` entry as written in the file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyEntry {
    pub match_prefix: String,

    /// Literal upstream origin, e.g. `http://localhost:9000`.
    #[serde(default)]
    pub upstream_origin: Option<String>,

    /// Name of an environment variable holding the upstream origin.
    #[serde(default)]
    pub upstream_origin_env: Option<String>,

    /// Rewrite the Host header to the upstream authority.
    #[serde(default)]
    pub change_origin: bool,
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Time allowed until the upstream response head arrives, in milliseconds.
    pub response_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 2_000,
            response_timeout_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus scrape endpoint; metrics stay disabled when unset.
    pub metrics_address: Option<SocketAddr>,
}

/// A validated alias: requests under `match_prefix` are read from `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRule {
    pub match_prefix: String,
    pub replacement: PathBuf,
}

impl AliasRule {
    pub fn new(match_prefix: impl Into<String>, replacement: impl Into<PathBuf>) -> Self {
        Self {
            match_prefix: match_prefix.into(),
            replacement: replacement.into(),
        }
    }
}

/// A validated proxy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    pub match_prefix: String,
    pub upstream_origin: Url,
    pub change_origin: bool,
}

impl ProxyRule {
    pub fn new(match_prefix: impl Into<String>, upstream_origin: Url, change_origin: bool) -> Self {
        Self {
            match_prefix: match_prefix.into(),
            upstream_origin,
            change_origin,
        }
    }
}

/// Fully resolved server configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_host: IpAddr,
    pub listen_port: u16,
    pub aliases: Vec<AliasRule>,
    pub proxy_rules: Vec<ProxyRule>,
    pub static_root: Option<PathBuf>,
    pub upstream: UpstreamConfig,
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// A config with no rules, listening on localhost.
    pub fn new(listen_port: u16) -> Self {
        Self {
            listen_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            listen_port,
            aliases: Vec::new(),
            proxy_rules: Vec::new(),
            static_root: None,
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.listen_port)
    }
}
