//! Time series commands (RedisTimeSeries)

use crate::module::{ModuleClient, ModuleResult};
use crate::params::Param;
use crate::reply::{Reply, Value};

/// What to do when a sample arrives for an existing timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Block,
    First,
    Last,
    Min,
    Max,
    Sum,
}

impl DuplicatePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Block => "BLOCK",
            DuplicatePolicy::First => "FIRST",
            DuplicatePolicy::Last => "LAST",
            DuplicatePolicy::Min => "MIN",
            DuplicatePolicy::Max => "MAX",
            DuplicatePolicy::Sum => "SUM",
        }
    }
}

/// Optional TS.CREATE arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    /// Maximum sample age in milliseconds
    pub retention_ms: Option<u64>,

    /// Store samples without compression
    pub uncompressed: bool,

    pub duplicate_policy: Option<DuplicatePolicy>,

    /// Label name/value pairs
    pub labels: Vec<(String, String)>,
}

/// RedisTimeSeries module client
pub struct RedisTimeSeries {
    client: ModuleClient,
}

module_client!(RedisTimeSeries, "RedisTimeSeries");

impl RedisTimeSeries {
    /// TS.CREATE key [RETENTION ms] [UNCOMPRESSED] [DUPLICATE_POLICY p] [LABELS label value ...]
    pub async fn create(&self, key: &str, options: &CreateOptions) -> ModuleResult<Reply> {
        let mut args = crate::params![key];
        if let Some(retention) = options.retention_ms {
            args.push(Param::from("RETENTION"));
            args.push(Param::from(retention));
        }
        if options.uncompressed {
            args.push(Param::from("UNCOMPRESSED"));
        }
        if let Some(policy) = options.duplicate_policy {
            args.push(Param::from("DUPLICATE_POLICY"));
            args.push(Param::from(policy.as_str()));
        }
        if !options.labels.is_empty() {
            args.push(Param::from("LABELS"));
            for (label, value) in &options.labels {
                args.push(Param::from(label));
                args.push(Param::from(value));
            }
        }
        self.client.execute("TS.CREATE", args).await
    }

    /// TS.ADD key timestamp value
    ///
    /// `timestamp` is milliseconds since the epoch or `*` for the server clock.
    pub async fn add(&self, key: &str, timestamp: &str, value: f64) -> ModuleResult<Reply> {
        let args = crate::params![key, timestamp, value];
        self.client.execute("TS.ADD", args).await
    }

    /// TS.GET key
    pub async fn get(&self, key: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("TS.GET", crate::params![key]).await
    }

    /// TS.RANGE key from to [COUNT n]
    pub async fn range(&self, key: &str, from: &str, to: &str, count: Option<u64>) -> ModuleResult<Value> {
        let mut args = crate::params![key, from, to];
        if let Some(count) = count {
            args.push(Param::from("COUNT"));
            args.push(Param::from(count));
        }
        self.client.execute_normalized("TS.RANGE", args).await
    }

    /// TS.INFO key
    pub async fn info(&self, key: &str) -> ModuleResult<Value> {
        self.client.execute_normalized("TS.INFO", crate::params![key]).await
    }

    /// TS.QUERYINDEX filter [filter ...]
    pub async fn query_index(&self, filters: &[&str]) -> ModuleResult<Reply> {
        let args = filters.iter().map(|f| Param::from(*f)).collect();
        self.client.execute("TS.QUERYINDEX", args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{last_frame, recording_client, s};

    #[tokio::test]
    async fn test_create_with_all_options() {
        let (client, frames) = recording_client(RedisTimeSeries::NAME, s("OK")).await;
        let ts = RedisTimeSeries::with_client(client);

        let options = CreateOptions {
            retention_ms: Some(60_000),
            uncompressed: true,
            duplicate_policy: Some(DuplicatePolicy::Last),
            labels: vec![("region".to_string(), "eu".to_string())],
        };
        ts.create("cpu:eu", &options).await.unwrap();

        assert_eq!(last_frame(&frames), vec![
            "TS.CREATE", "cpu:eu", "RETENTION", "60000", "UNCOMPRESSED",
            "DUPLICATE_POLICY", "LAST", "LABELS", "region", "eu",
        ]);
    }

    #[tokio::test]
    async fn test_info_flattens_label_pairs() {
        let reply = Reply::Array(vec![
            s("totalSamples"), Reply::Int(3),
            s("labels"), Reply::Array(vec![
                Reply::Array(vec![s("region"), s("eu")]),
                Reply::Array(vec![s("host"), s("a1")]),
            ]),
            s("sourceKey"), Reply::Nil,
            s("rules"), Reply::Array(vec![]),
        ]);
        let (client, _) = recording_client(RedisTimeSeries::NAME, reply).await;
        let ts = RedisTimeSeries::with_client(client);

        let info = ts.info("cpu:eu").await.unwrap();
        assert_eq!(info.get("totalSamples"), Some(&Value::Int(3)));
        assert_eq!(
            info.get("labels"),
            Some(&Value::List(vec![
                Value::Str("region".to_string()),
                Value::Str("eu".to_string()),
                Value::Str("host".to_string()),
                Value::Str("a1".to_string()),
            ]))
        );
        assert_eq!(info.get("sourceKey"), Some(&Value::Nil));
        assert_eq!(info.get("rules"), Some(&Value::List(vec![])));
    }

    #[tokio::test]
    async fn test_range_with_count() {
        let reply = Reply::Array(vec![
            Reply::Array(vec![Reply::Int(1000), s("1.5")]),
            Reply::Array(vec![Reply::Int(2000), s("2.5")]),
        ]);
        let (client, frames) = recording_client(RedisTimeSeries::NAME, reply).await;
        let ts = RedisTimeSeries::with_client(client);

        let samples = ts.range("cpu:eu", "-", "+", Some(2)).await.unwrap();
        assert_eq!(last_frame(&frames), vec!["TS.RANGE", "cpu:eu", "-", "+", "COUNT", "2"]);
        // list of [timestamp, value] pairs reads as timestamp -> value
        assert_eq!(samples, Value::Map(vec![
            ("1000".to_string(), Value::Str("1.5".to_string())),
            ("2000".to_string(), Value::Str("2.5".to_string())),
        ]));
    }
}
