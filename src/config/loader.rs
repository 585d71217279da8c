//! Configuration loading from disk and the process environment.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{ConfigFile, ServerConfig};
use crate::config::validation::{resolve, ValidationError};

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", ValidationErrors(.0))]
    Validation(Vec<ValidationError>),
}

struct ValidationErrors<'a>(&'a [ValidationError]);

impl fmt::Display for ValidationErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Read and parse a TOML config file without validating it.
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Directory relative paths in `path` resolve against: the file's parent, made absolute.
pub fn base_dir_of(path: &Path) -> Result<PathBuf, ConfigError> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    absolute(parent)
}

/// Make `path` absolute against the current working directory.
pub fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Validate a parsed file, reading environment-supplied origins through `env`.
pub fn resolve_config(
    file: &ConfigFile,
    base_dir: &Path,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    resolve(file, base_dir, env).map_err(ConfigError::Validation)
}

/// Load and validate configuration from a TOML file, using the process environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let file = read_config_file(path)?;
    let base_dir = base_dir_of(path)?;
    resolve_config(&file, &base_dir, &process_env)
}

/// Environment lookup backed by `std::env`. Non-UTF-8 values count as absent.
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}
