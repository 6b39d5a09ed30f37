//! JSON document commands (ReJSON)

use crate::module::{ModuleClient, ModuleResult};
use crate::params::Param;
use crate::reply::{Reply, Value};

/// When `JSON.SET` is allowed to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCondition {
    /// Always write
    #[default]
    Always,
    /// NX: only if the path does not exist
    IfMissing,
    /// XX: only if the path already exists
    IfExists,
}

/// ReJSON module client
pub struct ReJson {
    client: ModuleClient,
}

module_client!(ReJson, "ReJSON");

impl ReJson {
    /// JSON.SET key path json [NX|XX]
    pub async fn set(&self, key: &str, path: &str, json: &str, condition: SetCondition) -> ModuleResult<Reply> {
        let mut args = crate::params![key, path, json];
        match condition {
            SetCondition::Always => {}
            SetCondition::IfMissing => args.push(Param::from("NX")),
            SetCondition::IfExists => args.push(Param::from("XX")),
        }
        self.client.execute("JSON.SET", args).await
    }

    /// JSON.SET with a document serialized from `serde_json`
    pub async fn set_value(
        &self,
        key: &str,
        path: &str,
        value: &serde_json::Value,
        condition: SetCondition,
    ) -> ModuleResult<Reply> {
        self.set(key, path, &value.to_string(), condition).await
    }

    /// JSON.GET key [path ...]
    pub async fn get(&self, key: &str, paths: &[&str]) -> ModuleResult<Reply> {
        let mut args = crate::params![key];
        args.extend(paths.iter().map(|p| Param::from(*p)));
        self.client.execute("JSON.GET", args).await
    }

    /// JSON.MGET key [key ...] path
    pub async fn mget(&self, keys: &[&str], path: &str) -> ModuleResult<Reply> {
        let mut args: Vec<Param> = keys.iter().map(|k| Param::from(*k)).collect();
        args.push(Param::from(path));
        self.client.execute("JSON.MGET", args).await
    }

    /// JSON.DEL key [path]
    pub async fn del(&self, key: &str, path: Option<&str>) -> ModuleResult<Reply> {
        self.client.execute("JSON.DEL", key_and_path(key, path)).await
    }

    /// JSON.TYPE key [path]
    pub async fn type_of(&self, key: &str, path: Option<&str>) -> ModuleResult<Reply> {
        self.client.execute("JSON.TYPE", key_and_path(key, path)).await
    }

    /// JSON.NUMINCRBY key path number
    pub async fn num_incr_by(&self, key: &str, path: &str, number: f64) -> ModuleResult<Reply> {
        let args = crate::params![key, path, number];
        self.client.execute("JSON.NUMINCRBY", args).await
    }

    /// JSON.ARRAPPEND key path json [json ...]
    pub async fn arr_append(&self, key: &str, path: &str, items: &[&str]) -> ModuleResult<Reply> {
        let mut args = crate::params![key, path];
        args.extend(items.iter().map(|i| Param::from(*i)));
        self.client.execute("JSON.ARRAPPEND", args).await
    }

    /// JSON.OBJKEYS key [path]
    pub async fn obj_keys(&self, key: &str, path: Option<&str>) -> ModuleResult<Value> {
        self.client.execute_normalized("JSON.OBJKEYS", key_and_path(key, path)).await
    }
}

fn key_and_path(key: &str, path: Option<&str>) -> Vec<Param> {
    let mut args = crate::params![key];
    if let Some(path) = path {
        args.push(Param::from(path));
    }
    args
}
