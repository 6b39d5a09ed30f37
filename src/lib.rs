//! ferrum-modules - client layer for store extension modules
//!
//! Issues module commands against a Redis-compatible store and reshapes the
//! store's flat replies into structured values:
//! - `module`: connection state, command executor and error-handling policy
//! - `reply`: raw replies, structured values and the normalizer
//! - `params`: command parameters and inline literal formatting
//! - `transport`: single-node and cluster transports
//! - `protocol`: RESP2 framing used by the TCP transport
//! - `modules`: per-extension command builders

pub mod protocol;
pub mod reply;
pub mod params;
pub mod transport;
pub mod module;
pub mod modules;

/// Re-export commonly used types
pub use module::{ModuleClient, ModuleOptions, ModuleError, ModuleResult, ConnectionTarget, Connection};
pub use reply::{Reply, Value, Normalizer};
pub use params::{Param, stringify};
pub use transport::{NodeConfig, Transport, TcpTransport, ClusterTransport};
pub use modules::{ReJson, RedisGraph, RedisBloom, RedisTimeSeries, RediSearch};
