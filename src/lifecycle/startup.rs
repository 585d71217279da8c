//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the `ServerConfig` from file (or defaults), CLI overrides and environment
//! - Bind the listener only after the config has been accepted
//!
//! # Design Decisions
//! - Fail fast: any config error is fatal and nothing is bound
//! - CLI overrides are applied before validation so they are checked too

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;

use crate::config::loader::{absolute, base_dir_of, read_config_file, resolve_config};
use crate::config::{ConfigError, ConfigFile, ServerConfig};

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Config file; the built-in defaults are used when absent.
    pub config_path: Option<PathBuf>,
    /// Overrides `listen_port`.
    pub port: Option<i64>,
    /// Overrides `static_root`; relative to the working directory.
    pub static_root: Option<PathBuf>,
}

/// Assemble and validate the configuration.
pub fn build_config(
    options: &StartupOptions,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let (mut file, base_dir) = match &options.config_path {
        Some(path) => (read_config_file(path)?, base_dir_of(path)?),
        None => (ConfigFile::default(), absolute(Path::new(""))?),
    };

    if let Some(port) = options.port {
        file.listen_port = port;
    }
    if let Some(root) = &options.static_root {
        file.static_root = Some(absolute(root)?);
    }

    let config = resolve_config(&file, &base_dir, env)?;
    tracing::debug!(
        config_path = ?options.config_path,
        base_dir = %base_dir.display(),
        "Configuration resolved"
    );
    Ok(config)
}

/// Bind the dev server socket.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationError;

    fn api_env(var: &str) -> Option<String> {
        (var == "DEVPROXY_API_ORIGIN").then(|| "http://127.0.0.1:9000".to_string())
    }

    #[test]
    fn test_defaults_mirror_stock_setup() {
        let config = build_config(&StartupOptions::default(), &api_env).unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(config.listen_port, 3000);
        assert_eq!(config.aliases[0].match_prefix, "/@");
        assert_eq!(config.aliases[0].replacement, cwd.join("src"));
        assert_eq!(config.proxy_rules[0].match_prefix, "/api");
        assert!(config.proxy_rules[0].change_origin);
    }

    #[test]
    fn test_port_override_is_validated() {
        for port in [0, 70_000] {
            let options = StartupOptions {
                port: Some(port),
                ..StartupOptions::default()
            };
            match build_config(&options, &api_env) {
                Err(ConfigError::Validation(errors)) => {
                    assert_eq!(errors, vec![ValidationError::InvalidPort(port)]);
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_env_fails_before_bind() {
        let err = build_config(&StartupOptions::default(), &|_: &str| None).unwrap_err();
        assert!(err.to_string().contains("DEVPROXY_API_ORIGIN"));
    }

    #[test]
    fn test_static_root_override_relative_to_cwd() {
        let options = StartupOptions {
            static_root: Some(PathBuf::from("public")),
            ..StartupOptions::default()
        };
        let config = build_config(&options, &api_env).unwrap();
        assert_eq!(
            config.static_root,
            Some(std::env::current_dir().unwrap().join("public"))
        );
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let mut config = ServerConfig::new(1);
        config.listen_port = 0;
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
