//! Key routing for cluster mode
//!
//! Picks a node for a key with SipHash-1-3, so the same key always lands on
//! the same node for a given node count.

use bytes::Bytes;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Routes keys to node indexes
#[derive(Debug, Clone)]
pub struct KeyRouter {
    num_nodes: usize,
}

impl KeyRouter {
    /// Create a router over `num_nodes` nodes (at least one)
    pub fn new(num_nodes: usize) -> Self {
        KeyRouter { num_nodes: num_nodes.max(1) }
    }

    /// Node index for a key
    pub fn route_key(&self, key: &Bytes) -> usize {
        let mut hasher = SipHasher13::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.num_nodes
    }

    /// Node index for a command: its first argument is the key, keyless commands go to node 0
    pub fn route_command(&self, args: &[Bytes]) -> usize {
        args.first().map(|key| self.route_key(key)).unwrap_or(0)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}
