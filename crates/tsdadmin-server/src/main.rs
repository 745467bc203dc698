//! tsdadmin server
//!
//! HTTP admin front end of the time-series daemon:
//! - `/diediedie` : flush and shut down
//! - `/stats`     : metrics, one line per stat
//! - `/version`   : build metadata (`/version?json` for JSON)

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use tsdadmin_core::Result;
use tsdadmin_server::{app_state, config, server};

const DEFAULT_CONFIG_PATH: &str = "tsdadmin.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::var("TSDADMIN_CONFIG") {
        Ok(path) => config::load_from_file(&path)?,
        Err(_) => config::load_or_default(DEFAULT_CONFIG_PATH)?,
    };
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;

    tracing::info!(%listen, "tsdadmin-server starting");
    let listener = TcpListener::bind(listen).await?;

    server::serve(state, listener).await
}
