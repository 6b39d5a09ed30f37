//! Module client
//!
//! `ModuleClient` owns the connection to the store and is the single place
//! commands go through: it renders arguments, traces the call, routes it to the
//! single-node or cluster transport and applies the error-handling policy to
//! failures. Extension modules (`crate::modules`) are thin builders on top.

mod options;
mod error;

pub use options::{ModuleOptions, ConnectionTarget};
pub use error::{ModuleError, ModuleResult};

use crate::params::Param;
use crate::reply::{Normalizer, Reply, Value};
use crate::transport::{ClusterTransport, TcpTransport, Transport};
use bytes::Bytes;
use std::fmt;
use tracing::{debug, info, warn};

/// The connection a client holds, chosen at construction
pub enum Connection {
    /// One node
    Single(Box<dyn Transport>),

    /// Key-routed nodes
    Cluster(ClusterTransport),
}

impl Connection {
    /// Build unconnected TCP transports for a target
    pub fn from_target(target: ConnectionTarget) -> Self {
        match target {
            ConnectionTarget::Single(node) => Connection::Single(Box::new(TcpTransport::new(node))),
            ConnectionTarget::Cluster(nodes) => Connection::Cluster(ClusterTransport::new(nodes)),
        }
    }

    async fn connect(&mut self) -> anyhow::Result<()> {
        match self {
            Connection::Single(node) => node.connect().await,
            Connection::Cluster(cluster) => cluster.connect().await,
        }
    }

    async fn call(&self, command: &[Bytes], args: &[Bytes]) -> anyhow::Result<Reply> {
        match self {
            Connection::Single(node) => node.call(command, args).await,
            Connection::Cluster(cluster) => cluster.call(command, args).await,
        }
    }

    async fn quit(&mut self) -> anyhow::Result<()> {
        match self {
            Connection::Single(node) => node.quit().await,
            Connection::Cluster(cluster) => cluster.quit().await,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Single(_) => write!(f, "Connection::Single"),
            Connection::Cluster(cluster) => write!(f, "Connection::Cluster({} nodes)", cluster.num_nodes()),
        }
    }
}

/// Connection state and command executor of one module
#[derive(Debug)]
pub struct ModuleClient {
    /// Module name, used in error messages and traces
    name: String,

    /// Single-node or cluster connection
    connection: Connection,

    /// Behaviour flags
    options: ModuleOptions,

    /// Reply normalizer, honours `return_raw_response`
    normalizer: Normalizer,

    /// Set by `connect`, cleared by `disconnect`
    connected: bool,
}

impl ModuleClient {
    /// Create a client over TCP transports for `target`
    pub fn new(name: impl Into<String>, target: ConnectionTarget, options: ModuleOptions) -> Self {
        Self::with_connection(name, Connection::from_target(target), options)
    }

    /// Create a client over an existing connection
    pub fn with_connection(name: impl Into<String>, connection: Connection, options: ModuleOptions) -> Self {
        ModuleClient {
            name: name.into(),
            connection,
            options,
            normalizer: Normalizer::new(options.return_raw_response),
            connected: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.connection, Connection::Cluster(_))
    }

    /// Open the connection
    pub async fn connect(&mut self) -> ModuleResult<()> {
        self.connection.connect().await.map_err(|e| ModuleError::Connect {
            module: self.name.clone(),
            reason: format!("{:#}", e),
        })?;
        self.connected = true;
        info!("{} connected ({:?})", self.name, self.connection);
        Ok(())
    }

    /// Close the connection
    pub async fn disconnect(&mut self) -> ModuleResult<()> {
        self.connected = false;
        self.connection.quit().await.map_err(|e| ModuleError::Disconnect {
            module: self.name.clone(),
            reason: format!("{:#}", e),
        })?;
        info!("{} disconnected", self.name);
        Ok(())
    }

    /// Execute one command
    ///
    /// `command` may hold several space-separated tokens (`"GRAPH.CONFIG GET"`);
    /// the first one is the verb used in error messages. On failure the
    /// error-handling policy decides between `Err` and an `Ok` string reply
    /// carrying the message.
    pub async fn execute(&self, command: &str, args: Vec<Param>) -> ModuleResult<Reply> {
        let tokens: Vec<Bytes> = command
            .split_whitespace()
            .map(|token| Bytes::from(token.to_string()))
            .collect();
        let verb = command.split_whitespace().next().unwrap_or_default();

        let mut wire_args = Vec::with_capacity(args.len());
        for arg in &args {
            arg.append_args(&mut wire_args);
        }

        self.log(format_args!("{} {:?}", command, args));

        let result = if tokens.is_empty() {
            Err(anyhow::anyhow!("empty command"))
        } else if !self.connected {
            Err(anyhow::anyhow!("connection is not open"))
        } else {
            self.connection.call(&tokens, &wire_args).await
        };

        match result {
            Ok(reply) => {
                self.log(format_args!("{} -> {}", verb, reply));
                Ok(reply)
            }
            Err(e) => {
                let message = format!("{} class ({}): {:#}", self.name, verb, e);
                warn!("{}", message);
                self.handle_error(message)
            }
        }
    }

    /// Normalize a reply according to this client's options
    pub fn handle_response(&self, reply: Reply) -> Value {
        self.normalizer.normalize(reply)
    }

    /// Execute a command and normalize its reply
    pub async fn execute_normalized(&self, command: &str, args: Vec<Param>) -> ModuleResult<Value> {
        let reply = self.execute(command, args).await?;
        Ok(self.handle_response(reply))
    }

    /// Error-handling policy: raise, or hand the message back as a string reply
    pub fn handle_error(&self, message: String) -> ModuleResult<Reply> {
        if self.options.handle_errors {
            Err(ModuleError::Command(message))
        } else {
            Ok(Reply::Str(message))
        }
    }

    /// Debug trace, emitted only when `show_debug_logs` is set
    fn log(&self, message: fmt::Arguments<'_>) {
        if self.options.show_debug_logs {
            debug!(module = %self.name, "{}", message);
        }
    }
}
