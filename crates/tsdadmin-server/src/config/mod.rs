//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use tsdadmin_core::error::{AdminError, Result};

pub use schema::{AdminConfig, ServerSection, StatsSection};

pub fn load_from_file(path: &str) -> Result<AdminConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AdminError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the built-in defaults.
pub fn load_or_default(path: &str) -> Result<AdminConfig> {
    match fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            Ok(AdminConfig::default())
        }
        _ => load_from_file(path),
    }
}

pub fn load_from_str(s: &str) -> Result<AdminConfig> {
    let cfg: AdminConfig = serde_yaml::from_str(s)
        .map_err(|e| AdminError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
