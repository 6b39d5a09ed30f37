//! Module client configuration

use crate::transport::NodeConfig;
use serde::Deserialize;

/// Behaviour flags, fixed when the client is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    /// Failed commands return `Err` (true) or an error string reply (false)
    #[serde(alias = "isHandleError")]
    pub handle_errors: bool,

    /// Trace every command and reply at debug level
    #[serde(alias = "showDebugLogs")]
    pub show_debug_logs: bool,

    /// Skip reply normalization
    #[serde(alias = "returnRawResponse")]
    pub return_raw_response: bool,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        ModuleOptions {
            handle_errors: true,
            show_debug_logs: false,
            return_raw_response: false,
        }
    }
}

/// Where a module client connects to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionTarget {
    /// One node
    Single(NodeConfig),

    /// Several nodes, commands routed by key
    Cluster(Vec<NodeConfig>),
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        ConnectionTarget::Single(NodeConfig::default())
    }
}
