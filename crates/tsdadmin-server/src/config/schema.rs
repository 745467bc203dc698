use std::net::SocketAddr;

use serde::Deserialize;
use tsdadmin_core::error::{AdminError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub stats: StatsSection,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            stats: StatsSection::default(),
        }
    }
}

impl AdminConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AdminError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.stats.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// How long in-flight replies may drain once network resources are released.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=60000).contains(&self.shutdown_grace_ms) {
            return Err(AdminError::BadRequest(
                "server.shutdown_grace_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            AdminError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:4242".into()
}
fn default_shutdown_grace_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsSection {
    /// Namespace prepended to every stats line.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub host: Option<String>,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            host: None,
        }
    }
}

impl StatsSection {
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() || self.prefix.contains(char::is_whitespace) {
            return Err(AdminError::BadRequest(
                "stats.prefix must be non-empty and contain no whitespace".into(),
            ));
        }
        if let Some(host) = &self.host {
            if host.is_empty() || host.contains(char::is_whitespace) {
                return Err(AdminError::BadRequest(
                    "stats.host must be non-empty and contain no whitespace".into(),
                ));
            }
        }
        Ok(())
    }

    /// Configured host, else `$HOSTNAME`, else `localhost`.
    pub fn resolved_host(&self) -> String {
        self.host
            .clone()
            .or_else(|| {
                std::env::var("HOSTNAME")
                    .ok()
                    .filter(|h| !h.is_empty() && !h.contains(char::is_whitespace))
            })
            .unwrap_or_else(|| "localhost".to_string())
    }
}

fn default_prefix() -> String {
    "tsd".into()
}
