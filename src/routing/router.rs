//! Route lookup.
//!
//! # Responsibilities
//! - Store the alias and proxy tables built from `ServerConfig`
//! - Resolve a request path to a `Action`
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Aliases are consulted before proxy rules
//! - O(n) prefix scan per table (acceptable for typical rule counts)
//! - Explicit `Passthrough` rather than an error for unmatched paths

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::{AliasRule, ProxyRule, ServerConfig};
use crate::routing::matcher::PrefixTable;

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'r> {
    /// Serve from the filesystem under an alias replacement.
    Rewrite(Rewrite<'r>),
    /// Forward to an upstream origin.
    Forward(Forward<'r>),
    /// Hand to the default handler.
    Passthrough,
}

impl Action<'_> {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Rewrite(_) => "rewrite",
            Action::Forward(_) => "forward",
            Action::Passthrough => "passthrough",
        }
    }
}

/// An alias hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite<'r> {
    pub rule: &'r AliasRule,
    /// Request path with the alias prefix removed.
    pub remainder: String,
}

impl Rewrite<'_> {
    /// `replacement + remainder`, as a plain string concatenation.
    pub fn path(&self) -> PathBuf {
        let mut joined = OsString::from(self.rule.replacement.as_os_str());
        joined.push(&self.remainder);
        PathBuf::from(joined)
    }

    /// Directory the remainder is served from.
    pub fn root(&self) -> &Path {
        &self.rule.replacement
    }
}

/// A proxy rule hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward<'r> {
    pub rule: &'r ProxyRule,
    /// Full request path; the prefix is not stripped.
    pub path: String,
}

impl Forward<'_> {
    pub fn origin(&self) -> &Url {
        &self.rule.upstream_origin
    }

    pub fn change_origin(&self) -> bool {
        self.rule.change_origin
    }

    /// Absolute upstream URL for this request.
    pub fn target(&self, query: Option<&str>) -> String {
        let origin = self.rule.upstream_origin.as_str().trim_end_matches('/');
        match query {
            Some(q) => format!("{}{}?{}", origin, self.path, q),
            None => format!("{}{}", origin, self.path),
        }
    }
}

/// Resolves request paths against the alias and proxy tables.
#[derive(Debug, Clone)]
pub struct DevServerRouter {
    aliases: PrefixTable<AliasRule>,
    proxies: PrefixTable<ProxyRule>,
}

impl DevServerRouter {
    /// Build the lookup tables from a config.
    ///
    /// Overlap is not rejected here; when prefixes overlap the longest one wins.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            aliases: PrefixTable::new(
                config
                    .aliases
                    .iter()
                    .map(|rule| (rule.match_prefix.clone(), rule.clone())),
            ),
            proxies: PrefixTable::new(
                config
                    .proxy_rules
                    .iter()
                    .map(|rule| (rule.match_prefix.clone(), rule.clone())),
            ),
        }
    }

    /// Map a request path to an action. Pure: no I/O, no state.
    pub fn resolve(&self, path: &str) -> Action<'_> {
        if !path.starts_with('/') {
            return Action::Passthrough;
        }

        if let Some((rule, remainder)) = self.aliases.longest_match(path) {
            return Action::Rewrite(Rewrite {
                rule,
                remainder: remainder.to_string(),
            });
        }

        if let Some((rule, _)) = self.proxies.longest_match(path) {
            return Action::Forward(Forward {
                rule,
                path: path.to_string(),
            });
        }

        Action::Passthrough
    }

    pub fn aliases(&self) -> &PrefixTable<AliasRule> {
        &self.aliases
    }

    pub fn proxies(&self) -> &PrefixTable<ProxyRule> {
        &self.proxies
    }
}
