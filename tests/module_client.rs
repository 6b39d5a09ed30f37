use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use ferrum_modules::protocol::{RespEncoder, RespParser, RespValue};
use ferrum_modules::modules::SetCondition;
use ferrum_modules::{
    ConnectionTarget, ModuleClient, ModuleError, ModuleOptions, NodeConfig, Param, ReJson, RedisBloom,
    Reply, Value,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<Vec<String>>>>;

/// Fake store: accepts one connection and answers each command with `handler`
async fn spawn_server(handler: fn(&[String]) -> RespValue) -> (NodeConfig, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen: Seen = Arc::default();
    let log = seen.clone();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = BytesMut::with_capacity(4096);
        loop {
            while let Some(frame) = RespParser::parse(&mut buf).expect("valid frame") {
                let parts: Vec<String> = frame
                    .as_array()
                    .expect("command array")
                    .iter()
                    .map(|part| match part {
                        RespValue::BulkString(b) => String::from_utf8_lossy(b).into_owned(),
                        other => other.to_string(),
                    })
                    .collect();
                log.lock().unwrap().push(parts.clone());

                let is_quit = parts[0] == "QUIT";
                let reply = if is_quit { RespValue::SimpleString("OK".to_string()) } else { handler(&parts) };
                socket.write_all(&RespEncoder::encode(&reply)).await.expect("write");
                if is_quit {
                    return;
                }
            }
            if socket.read_buf(&mut buf).await.expect("read") == 0 {
                return;
            }
        }
    });

    (NodeConfig::new(addr.ip().to_string(), addr.port()), seen)
}

fn bulk(s: &str) -> RespValue {
    RespValue::bulk_string(s.to_string())
}

fn bloom_server(parts: &[String]) -> RespValue {
    match parts[0].as_str() {
        "AUTH" | "SELECT" => RespValue::SimpleString("OK".to_string()),
        "BF.INFO" => RespValue::Array(vec![
            bulk("Capacity"), RespValue::Integer(100),
            bulk("Size"), RespValue::Integer(240),
        ]),
        "BF.ADD" => RespValue::Integer(1),
        _ => RespValue::Error(format!("ERR unknown command '{}'", parts[0])),
    }
}

#[tokio::test]
async fn test_single_node_round_trip() {
    let (mut node, seen) = spawn_server(bloom_server).await;
    node.password = Some("secret".to_string());
    node.db = 2;

    let mut bloom = RedisBloom::new(ConnectionTarget::Single(node), ModuleOptions::default());
    bloom.connect().await.unwrap();

    assert_eq!(bloom.add("filter", "alice").await.unwrap(), Reply::Int(1));

    let info = bloom.info("filter").await.unwrap();
    assert_eq!(info, Value::Map(vec![
        ("Capacity".to_string(), Value::Int(100)),
        ("Size".to_string(), Value::Int(240)),
    ]));

    bloom.disconnect().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], vec!["AUTH", "secret"]);
    assert_eq!(seen[1], vec!["SELECT", "2"]);
    assert_eq!(seen[2], vec!["BF.ADD", "filter", "alice"]);
    assert_eq!(seen.last().unwrap(), &vec!["QUIT".to_string()]);
}

#[tokio::test]
async fn test_error_reply_raises_with_module_and_verb() {
    let (node, _) = spawn_server(bloom_server).await;
    let mut json = ReJson::new(ConnectionTarget::Single(node), ModuleOptions::default());
    json.connect().await.unwrap();

    let err = json.set("doc", "$", "{}", SetCondition::Always).await.unwrap_err();
    match err {
        ModuleError::Command(message) => {
            assert_eq!(message, "ReJSON class (JSON.SET): ERR unknown command 'JSON.SET'");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_error_reply_returned_as_string_when_not_raising() {
    let (node, _) = spawn_server(bloom_server).await;
    let options = ModuleOptions { handle_errors: false, ..ModuleOptions::default() };
    let mut client = ModuleClient::new("ReJSON", ConnectionTarget::Single(node), options);
    client.connect().await.unwrap();

    let reply = client.execute("JSON.GET", vec![Param::from("doc")]).await.unwrap();
    let message = reply.as_str().expect("error string");
    assert!(message.starts_with("ReJSON class (JSON.GET): "));
    assert!(message.contains("unknown command"));
}

#[tokio::test]
async fn test_raw_mode_returns_flat_reply() {
    let (node, _) = spawn_server(bloom_server).await;
    let options = ModuleOptions { return_raw_response: true, ..ModuleOptions::default() };
    let mut bloom = RedisBloom::new(ConnectionTarget::Single(node), options);
    bloom.connect().await.unwrap();

    let info = bloom.info("filter").await.unwrap();
    assert_eq!(info, Value::List(vec![
        Value::Str("Capacity".to_string()), Value::Int(100),
        Value::Str("Size".to_string()), Value::Int(240),
    ]));
}

#[tokio::test]
async fn test_cluster_routes_keyed_commands() {
    let (first, first_seen) = spawn_server(bloom_server).await;
    let (second, second_seen) = spawn_server(bloom_server).await;

    let mut bloom = RedisBloom::new(ConnectionTarget::Cluster(vec![first, second]), ModuleOptions::default());
    assert!(bloom.client().is_cluster());
    bloom.connect().await.unwrap();

    for _ in 0..3 {
        assert_eq!(bloom.add("filter:users", "alice").await.unwrap(), Reply::Int(1));
    }
    bloom.disconnect().await.unwrap();

    let adds = |seen: &Seen| seen.lock().unwrap().iter().filter(|c| c[0] == "BF.ADD").count();
    let (a, b) = (adds(&first_seen), adds(&second_seen));
    assert_eq!(a + b, 3);
    assert!(a == 3 || b == 3, "same key must always reach the same node");
}

#[tokio::test]
async fn test_connect_refused_is_reported() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = ModuleClient::new(
        "RedisGraph",
        ConnectionTarget::Single(NodeConfig::new("127.0.0.1", port)),
        ModuleOptions::default(),
    );
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ModuleError::Connect { .. }));
    assert!(err.to_string().starts_with("RedisGraph class: connect failed"));
    assert!(!client.is_connected());
}
