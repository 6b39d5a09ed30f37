//! Transports
//!
//! A transport carries one command to the store and brings back its reply.
//! `TcpTransport` talks RESP2 to a single node; `ClusterTransport` spreads
//! commands over several node transports by key.

mod tcp;
mod cluster;
mod router;

pub use tcp::TcpTransport;
pub use cluster::ClusterTransport;
pub use router::KeyRouter;

use crate::reply::Reply;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

/// Single call/response primitive against the store
///
/// `command` holds the command tokens (usually just the verb), `args` the
/// already rendered arguments. A reply carrying a store error must be reported
/// as `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the underlying connection
    async fn connect(&mut self) -> anyhow::Result<()>;

    /// Send one command and wait for its reply
    async fn call(&self, command: &[Bytes], args: &[Bytes]) -> anyhow::Result<Reply>;

    /// Close the underlying connection
    async fn quit(&mut self) -> anyhow::Result<()>;
}

/// Connection settings for one node
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Host name or IP address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// ACL user name, sent with AUTH when a password is set
    pub username: Option<String>,

    /// Password, triggers AUTH on connect
    pub password: Option<String>,

    /// Logical database selected on connect
    pub db: u32,

    /// Connect timeout in milliseconds
    #[serde(alias = "connectTimeout")]
    pub connect_timeout_ms: u64,

    /// Per-command timeout in milliseconds (None = wait forever)
    #[serde(alias = "commandTimeout")]
    pub command_timeout_ms: Option<u64>,
}

impl NodeConfig {
    /// Settings for `host:port` with everything else defaulted
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        NodeConfig {
            host: host.into(),
            port,
            ..NodeConfig::default()
        }
    }

    /// Parse `host:port`; a missing port means 6379
    pub fn parse(addr: &str) -> anyhow::Result<Self> {
        match addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| anyhow::anyhow!("invalid port in address '{}'", addr))?;
                Ok(NodeConfig::new(host, port))
            }
            None => Ok(NodeConfig::new(addr, 6379)),
        }
    }

    /// `host:port` string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: None,
            password: None,
            db: 0,
            connect_timeout_ms: 5000,
            command_timeout_ms: None,
        }
    }
}
