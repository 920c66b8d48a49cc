use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let addr = std::env::var("JURNALD_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8787".to_string())
            .parse()
            .context("JURNALD_ADDR must be host:port")?;
        let db_path = std::env::var_os("JURNALD_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("jurnal.sqlite3"));
        Ok(Config { addr, db_path })
    }
}
