//! Graph commands (RedisGraph)
//!
//! Query parameters are not sent as separate arguments: they are inlined in
//! front of the query as a `CYPHER name=value ...` header, each value rendered
//! with `stringify`.

use crate::module::{ModuleClient, ModuleResult};
use crate::params::{stringify, Param};
use crate::reply::{Reply, Value};

/// RedisGraph module client
pub struct RedisGraph {
    client: ModuleClient,
}

module_client!(RedisGraph, "RedisGraph");

impl RedisGraph {
    /// GRAPH.QUERY graph query
    pub async fn query(&self, graph: &str, query: &str, params: &[(&str, Param)]) -> ModuleResult<Value> {
        self.graph_command("GRAPH.QUERY", graph, query, params).await
    }

    /// GRAPH.RO_QUERY graph query
    pub async fn read_only_query(&self, graph: &str, query: &str, params: &[(&str, Param)]) -> ModuleResult<Value> {
        self.graph_command("GRAPH.RO_QUERY", graph, query, params).await
    }

    /// GRAPH.PROFILE graph query
    pub async fn profile(&self, graph: &str, query: &str, params: &[(&str, Param)]) -> ModuleResult<Value> {
        self.graph_command("GRAPH.PROFILE", graph, query, params).await
    }

    /// GRAPH.EXPLAIN graph query
    pub async fn explain(&self, graph: &str, query: &str, params: &[(&str, Param)]) -> ModuleResult<Value> {
        self.graph_command("GRAPH.EXPLAIN", graph, query, params).await
    }

    /// GRAPH.DELETE graph
    pub async fn delete(&self, graph: &str) -> ModuleResult<Reply> {
        self.client.execute("GRAPH.DELETE", crate::params![graph]).await
    }

    /// GRAPH.SLOWLOG graph
    pub async fn slowlog(&self, graph: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("GRAPH.SLOWLOG", crate::params![graph]).await
    }

    /// GRAPH.LIST
    pub async fn list(&self) -> ModuleResult<Reply> {
        self.client.execute("GRAPH.LIST", Vec::new()).await
    }

    /// GRAPH.CONFIG GET name
    pub async fn config_get(&self, name: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("GRAPH.CONFIG GET", crate::params![name]).await
    }

    /// GRAPH.CONFIG SET name value
    pub async fn config_set(&self, name: &str, value: impl Into<Param>) -> ModuleResult<Reply> {
        self.client.execute("GRAPH.CONFIG SET", vec![Param::from(name), value.into()]).await
    }

    async fn graph_command(
        &self,
        command: &str,
        graph: &str,
        query: &str,
        params: &[(&str, Param)],
    ) -> ModuleResult<Value> {
        let args = crate::params![graph, cypher_query(query, params)];
        self.client.execute_normalized(command, args).await
    }
}

/// Prefix a query with its `CYPHER` parameter header (none when `params` is empty)
pub fn cypher_query(query: &str, params: &[(&str, Param)]) -> String {
    if params.is_empty() {
        return query.to_string();
    }

    let mut header = String::from("CYPHER");
    for (name, value) in params {
        header.push(' ');
        header.push_str(name);
        header.push('=');
        header.push_str(&stringify(value));
    }
    format!("{} {}", header, query)
}
