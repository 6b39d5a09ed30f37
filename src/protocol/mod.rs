//! RESP2 protocol implementation
//!
//! Frames outgoing commands and parses the replies sent back by the store.
//! It knows nothing about modules, normalization or connections.

mod types;
mod resp;

pub use types::{RespValue, RespError};
pub use resp::{RespParser, RespEncoder};
