//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use pulsewatch_core::error::{PulseError, Result};

pub use schema::{ApiSection, LoadSection, MetricsSection, ServerConfig, ServerSection};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "PULSEWATCH_CONFIG";
/// Default config path when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "pulsewatch.yaml";
/// Env var overriding the listen port.
pub const PORT_ENV: &str = "PORT";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PulseError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| PulseError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Like [`load_from_file`], but a missing file yields the defaults.
pub fn load_or_default(path: &str) -> Result<ServerConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            Ok(ServerConfig::default())
        }
        Err(e) => Err(PulseError::Internal(format!("read config failed ({path}): {e}"))),
    }
}

/// Resolve config from the environment: file from `PULSEWATCH_CONFIG`
/// (default `pulsewatch.yaml`), then `PORT` override.
pub fn load_from_env() -> Result<ServerConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut cfg = load_or_default(&path)?;
    if let Ok(port) = std::env::var(PORT_ENV) {
        cfg.server.apply_port_override(&port)?;
    }
    Ok(cfg)
}
