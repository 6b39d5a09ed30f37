//! Full-text search commands (RediSearch)

use crate::module::{ModuleClient, ModuleResult};
use crate::params::Param;
use crate::reply::{Reply, Value};

/// RediSearch module client
pub struct RediSearch {
    client: ModuleClient,
}

module_client!(RediSearch, "RediSearch");

impl RediSearch {
    /// FT.SEARCH index query [LIMIT offset count]
    pub async fn search(&self, index: &str, query: &str, limit: Option<(u64, u64)>) -> ModuleResult<Value> {
        let mut args = crate::params![index, query];
        if let Some((offset, count)) = limit {
            args.push(Param::from("LIMIT"));
            args.push(Param::from(offset));
            args.push(Param::from(count));
        }
        self.client.execute_normalized("FT.SEARCH", args).await
    }

    /// FT.INFO index
    pub async fn info(&self, index: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("FT.INFO", crate::params![index]).await
    }

    /// FT.DROPINDEX index [DD]
    pub async fn drop_index(&self, index: &str, delete_documents: bool) -> ModuleResult<Reply> {
        let mut args = crate::params![index];
        if delete_documents {
            args.push(Param::from("DD"));
        }
        self.client.execute("FT.DROPINDEX", args).await
    }

    /// FT.ALIASADD alias index
    pub async fn alias_add(&self, alias: &str, index: &str) -> ModuleResult<Reply> {
        self.client.execute("FT.ALIASADD", crate::params![alias, index]).await
    }

    /// FT.ALIASDEL alias
    pub async fn alias_del(&self, alias: &str) -> ModuleResult<Reply> {
        self.client.execute("FT.ALIASDEL", crate::params![alias]).await
    }

    /// FT.TAGVALS index field
    pub async fn tag_values(&self, index: &str, field: &str) -> ModuleResult<Reply> {
        self.client.execute("FT.TAGVALS", crate::params![index, field]).await
    }

    /// FT.CONFIG GET option
    pub async fn config_get(&self, option: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("FT.CONFIG GET", crate::params![option]).await
    }
}
