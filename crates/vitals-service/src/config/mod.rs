//! Service config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use vitals_core::error::{Result, VitalsError};

pub use schema::{ServiceConfig, ServiceSection};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "vitals.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServiceConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        VitalsError::Config(format!("read config failed ({}): {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig =
        serde_yaml::from_str(s).map_err(|e| VitalsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for this process.
///
/// An explicit path (CLI argument or `VITALS_CONFIG`) must exist. The default
/// `vitals.yaml` is optional and falls back to built-in defaults.
pub fn resolve(explicit: Option<String>) -> Result<ServiceConfig> {
    let explicit = explicit.or_else(|| std::env::var("VITALS_CONFIG").ok());
    if let Some(path) = explicit {
        tracing::info!(%path, "loading config");
        return load_from_file(path);
    }

    match fs::read_to_string(DEFAULT_CONFIG_PATH) {
        Ok(s) => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "loading config");
            load_from_str(&s)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("no config file, using defaults");
            Ok(ServiceConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
