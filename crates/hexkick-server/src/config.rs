//! Server configuration from the environment.

use anyhow::{bail, Context};
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Snapshots queued per subscriber before it is dropped (`SUBSCRIBER_BUFFER`)
    pub subscriber_buffer: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR must be a socket address")?;

        let subscriber_buffer = match lookup("SUBSCRIBER_BUFFER") {
            Some(raw) => raw
                .parse()
                .context("SUBSCRIBER_BUFFER must be a positive integer")?,
            None => DEFAULT_SUBSCRIBER_BUFFER,
        };
        if subscriber_buffer == 0 {
            bail!("SUBSCRIBER_BUFFER must be at least 1");
        }

        Ok(Self {
            addr,
            subscriber_buffer,
        })
    }
}
