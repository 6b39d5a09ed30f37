//! Bloom filter commands (RedisBloom)

use crate::module::{ModuleClient, ModuleResult};
use crate::params::Param;
use crate::reply::{Reply, Value};

/// Optional BF.RESERVE arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReserveOptions {
    /// Growth factor of sub-filters
    pub expansion: Option<u32>,

    /// Fail instead of growing once full
    pub non_scaling: bool,
}

/// RedisBloom module client
pub struct RedisBloom {
    client: ModuleClient,
}

module_client!(RedisBloom, "RedisBloom");

impl RedisBloom {
    /// BF.RESERVE key error_rate capacity [EXPANSION n] [NONSCALING]
    pub async fn reserve(
        &self,
        key: &str,
        error_rate: f64,
        capacity: u64,
        options: ReserveOptions,
    ) -> ModuleResult<Reply> {
        let mut args = crate::params![key, error_rate, capacity];
        if let Some(expansion) = options.expansion {
            args.push(Param::from("EXPANSION"));
            args.push(Param::from(expansion));
        }
        if options.non_scaling {
            args.push(Param::from("NONSCALING"));
        }
        self.client.execute("BF.RESERVE", args).await
    }

    /// BF.ADD key item
    pub async fn add(&self, key: &str, item: &str) -> ModuleResult<Reply> {
        self.client.execute("BF.ADD", crate::params![key, item]).await
    }

    /// BF.MADD key item [item ...]
    pub async fn madd(&self, key: &str, items: &[&str]) -> ModuleResult<Reply> {
        self.client.execute("BF.MADD", key_and_items(key, items)).await
    }

    /// BF.EXISTS key item
    pub async fn exists(&self, key: &str, item: &str) -> ModuleResult<Reply> {
        self.client.execute("BF.EXISTS", crate::params![key, item]).await
    }

    /// BF.MEXISTS key item [item ...]
    pub async fn mexists(&self, key: &str, items: &[&str]) -> ModuleResult<Reply> {
        self.client.execute("BF.MEXISTS", key_and_items(key, items)).await
    }

    /// BF.INFO key
    pub async fn info(&self, key: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("BF.INFO", crate::params![key]).await
    }
}

fn key_and_items(key: &str, items: &[&str]) -> Vec<Param> {
    let mut args = crate::params![key];
    args.extend(items.iter().map(|item| Param::from(*item)));
    args
}
