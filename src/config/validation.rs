//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve environment-supplied origins and relative paths
//! - Validate value ranges (port, timeouts) and origin URLs
//! - Detect duplicate and overlapping prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Environment access goes through a lookup function so callers decide
//!   where values come from
//! - Runs before any socket is bound

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::schema::{AliasRule, ConfigFile, ProxyRule, ServerConfig};

/// Which rule table a prefix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTable {
    Alias,
    Proxy,
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTable::Alias => f.write_str("alias"),
            RuleTable::Proxy => f.write_str("proxy"),
        }
    }
}

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listen_port {0} is outside 1-65535")]
    InvalidPort(i64),

    #[error("listen_host '{0}' is not an IP address")]
    InvalidHost(String),

    #[error("{table} prefix '{prefix}' must start with '/'")]
    InvalidPrefix { table: RuleTable, prefix: String },

    #[error("{table} prefix '{prefix}' is declared more than once")]
    DuplicatePrefix { table: RuleTable, prefix: String },

    #[error("alias prefixes '{shorter}' and '{longer}' overlap")]
    OverlappingAlias { shorter: String, longer: String },

    #[error("alias '{prefix}' replacement '{}' is not an absolute path", .replacement.display())]
    RelativeReplacement { prefix: String, replacement: PathBuf },

    #[error("proxy rule '{prefix}' needs exactly one of upstream_origin or upstream_origin_env")]
    AmbiguousOrigin { prefix: String },

    #[error("proxy rule '{prefix}': environment variable {var} is not set")]
    MissingEnv { prefix: String, var: String },

    #[error("proxy rule '{prefix}': invalid upstream origin '{origin}': {reason}")]
    InvalidOrigin {
        prefix: String,
        origin: String,
        reason: String,
    },

    #[error("upstream.{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Validate `file` and turn it into a `ServerConfig`.
///
/// Relative paths are joined onto `base_dir`. Origins named through
/// `upstream_origin_env` are read with `env`.
pub fn resolve(
    file: &ConfigFile,
    base_dir: &Path,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ServerConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listen_port = match validate_port(file.listen_port) {
        Ok(port) => port,
        Err(e) => {
            errors.push(e);
            0
        }
    };

    let listen_host = match parse_host(&file.listen_host) {
        Ok(host) => host,
        Err(e) => {
            errors.push(e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    };

    let mut aliases = Vec::with_capacity(file.aliases.len());
    for entry in &file.aliases {
        if let Err(e) = validate_prefix(RuleTable::Alias, &entry.match_prefix) {
            errors.push(e);
        }
        let replacement = base_dir.join(&entry.replacement);
        if !replacement.is_absolute() {
            errors.push(ValidationError::RelativeReplacement {
                prefix: entry.match_prefix.clone(),
                replacement,
            });
            continue;
        }
        aliases.push(AliasRule::new(entry.match_prefix.clone(), replacement));
    }

    let mut proxy_rules = Vec::with_capacity(file.proxy_rules.len());
    for entry in &file.proxy_rules {
        if let Err(e) = validate_prefix(RuleTable::Proxy, &entry.match_prefix) {
            errors.push(e);
        }

        let raw = match (&entry.upstream_origin, &entry.upstream_origin_env) {
            (Some(origin), None) => origin.clone(),
            (None, Some(var)) => match env(var) {
                Some(value) => value,
                None => {
                    errors.push(ValidationError::MissingEnv {
                        prefix: entry.match_prefix.clone(),
                        var: var.clone(),
                    });
                    continue;
                }
            },
            _ => {
                errors.push(ValidationError::AmbiguousOrigin {
                    prefix: entry.match_prefix.clone(),
                });
                continue;
            }
        };

        match parse_origin(&entry.match_prefix, &raw) {
            Ok(origin) => proxy_rules.push(ProxyRule::new(
                entry.match_prefix.clone(),
                origin,
                entry.change_origin,
            )),
            Err(e) => errors.push(e),
        }
    }

    errors.extend(duplicate_prefixes(
        RuleTable::Alias,
        file.aliases.iter().map(|a| a.match_prefix.as_str()),
    ));
    errors.extend(duplicate_prefixes(
        RuleTable::Proxy,
        file.proxy_rules.iter().map(|p| p.match_prefix.as_str()),
    ));
    errors.extend(overlapping_aliases(
        file.aliases.iter().map(|a| a.match_prefix.as_str()),
    ));

    if file.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "connect_timeout_ms",
        });
    }
    if file.upstream.response_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "response_timeout_ms",
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ServerConfig {
        listen_host,
        listen_port,
        aliases,
        proxy_rules,
        static_root: file.static_root.as_ref().map(|root| base_dir.join(root)),
        upstream: file.upstream.clone(),
        observability: file.observability.clone(),
    })
}

fn validate_port(port: i64) -> Result<u16, ValidationError> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ValidationError::InvalidPort(port)),
    }
}

fn parse_host(host: &str) -> Result<IpAddr, ValidationError> {
    if host.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    host.parse()
        .map_err(|_| ValidationError::InvalidHost(host.to_string()))
}

fn validate_prefix(table: RuleTable, prefix: &str) -> Result<(), ValidationError> {
    if prefix.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::InvalidPrefix {
            table,
            prefix: prefix.to_string(),
        })
    }
}

/// Parse an upstream origin: absolute http(s) URL with a host and nothing after the path.
pub fn parse_origin(prefix: &str, raw: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidOrigin {
        prefix: prefix.to_string(),
        origin: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("origin must not carry a query or fragment".to_string()));
    }
    Ok(url)
}

fn duplicate_prefixes<'a>(
    table: RuleTable,
    prefixes: impl Iterator<Item = &'a str>,
) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();
    for prefix in prefixes {
        if !seen.insert(prefix) && reported.insert(prefix) {
            errors.push(ValidationError::DuplicatePrefix {
                table,
                prefix: prefix.to_string(),
            });
        }
    }
    errors
}

fn overlapping_aliases<'a>(prefixes: impl Iterator<Item = &'a str>) -> Vec<ValidationError> {
    let mut distinct: Vec<&str> = prefixes.collect();
    distinct.sort_unstable();
    distinct.dedup();

    let mut errors = Vec::new();
    for (i, shorter) in distinct.iter().enumerate() {
        for longer in &distinct[i + 1..] {
            if longer.starts_with(shorter) {
                errors.push(ValidationError::OverlappingAlias {
                    shorter: shorter.to_string(),
                    longer: longer.to_string(),
                });
            }
        }
    }
    errors
}
