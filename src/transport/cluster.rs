//! Cluster transport
//!
//! Holds one transport per node and sends every command to the node owning
//! its key. The node list is static: no topology discovery, no redirects.

use super::{KeyRouter, NodeConfig, TcpTransport, Transport};
use crate::reply::Reply;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

/// Key-routed set of node transports
pub struct ClusterTransport {
    nodes: Vec<Box<dyn Transport>>,
    router: KeyRouter,
}

impl ClusterTransport {
    /// Create TCP transports for every node
    pub fn new(nodes: Vec<NodeConfig>) -> Self {
        let transports = nodes
            .into_iter()
            .map(|config| Box::new(TcpTransport::new(config)) as Box<dyn Transport>)
            .collect();
        Self::from_transports(transports)
    }

    /// Build a cluster from existing transports
    pub fn from_transports(nodes: Vec<Box<dyn Transport>>) -> Self {
        let router = KeyRouter::new(nodes.len());
        ClusterTransport { nodes, router }
    }

    /// Get number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the node a command would be sent to
    pub fn node_for(&self, args: &[Bytes]) -> usize {
        self.router.route_command(args)
    }
}

#[async_trait]
impl Transport for ClusterTransport {
    async fn connect(&mut self) -> anyhow::Result<()> {
        info!("Connecting cluster with {} nodes", self.nodes.len());
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            node.connect().await.with_context(|| format!("cluster node {}", idx))?;
        }
        Ok(())
    }

    async fn call(&self, command: &[Bytes], args: &[Bytes]) -> anyhow::Result<Reply> {
        let idx = self.node_for(args);
        let node = self
            .nodes
            .get(idx)
            .ok_or_else(|| anyhow::anyhow!("cluster has no nodes"))?;

        debug!("Routing command to cluster node {}", idx);
        node.call(command, args).await
    }

    async fn quit(&mut self) -> anyhow::Result<()> {
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            node.quit().await.with_context(|| format!("cluster node {}", idx))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answers every call with its own node id and counts calls
    struct EchoNode {
        id: i64,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for EchoNode {
        async fn connect(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn call(&self, _command: &[Bytes], _args: &[Bytes]) -> anyhow::Result<Reply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::Int(self.id))
        }

        async fn quit(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn cluster(n: i64) -> (ClusterTransport, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let nodes = (0..n)
            .map(|id| Box::new(EchoNode { id, calls: calls.clone() }) as Box<dyn Transport>)
            .collect();
        (ClusterTransport::from_transports(nodes), calls)
    }

    #[tokio::test]
    async fn test_same_key_same_node() {
        let (cluster, calls) = cluster(3);
        let verb = [Bytes::from("BF.ADD")];
        let args = [Bytes::from("filter:users"), Bytes::from("alice")];

        let first = cluster.call(&verb, &args).await.unwrap();
        let second = cluster.call(&verb, &args).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Reply::Int(cluster.node_for(&args) as i64));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keyless_command_goes_to_node_zero() {
        let (cluster, _) = cluster(3);
        let reply = cluster.call(&[Bytes::from("GRAPH.LIST")], &[]).await.unwrap();
        assert_eq!(reply, Reply::Int(0));
    }

    #[tokio::test]
    async fn test_empty_cluster_fails() {
        let (cluster, _) = cluster(0);
        assert!(cluster.call(&[Bytes::from("PING")], &[]).await.is_err());
    }
}
