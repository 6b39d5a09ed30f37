//! Single-node RESP2 transport over TCP

use super::{NodeConfig, Transport};
use crate::protocol::{RespEncoder, RespParser, RespValue};
use crate::reply::Reply;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One open stream with its framing buffers
pub(crate) struct NodeStream<S = TcpStream> {
    /// Socket (or any byte stream in tests)
    stream: S,

    /// Read buffer
    read_buffer: BytesMut,

    /// Write buffer
    write_buffer: BytesMut,
}

impl<S: AsyncRead + AsyncWrite + Unpin> NodeStream<S> {
    pub(crate) fn new(stream: S) -> Self {
        NodeStream {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Write one request frame and read exactly one reply
    pub(crate) async fn request(&mut self, frame: &RespValue) -> anyhow::Result<RespValue> {
        self.write_buffer.clear();
        RespEncoder::encode_to(&mut self.write_buffer, frame);
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;

        loop {
            if let Some(value) = RespParser::parse(&mut self.read_buffer)? {
                debug!("Reply: {}", value);
                return Ok(value);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                bail!("connection closed by server");
            }
        }
    }

    /// Send a handshake command that must not answer with an error
    async fn handshake(&mut self, frame: RespValue) -> anyhow::Result<()> {
        match self.request(&frame).await? {
            RespValue::Error(message) => Err(anyhow!(message)),
            _ => Ok(()),
        }
    }
}

/// RESP2 connection to one node
pub struct TcpTransport {
    config: NodeConfig,
    stream: Mutex<Option<NodeStream>>,
}

impl TcpTransport {
    /// Create an unconnected transport for a node
    pub fn new(config: NodeConfig) -> Self {
        TcpTransport {
            config,
            stream: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> anyhow::Result<()> {
        let addr = self.config.addr();
        let socket = timeout(self.config.connect_timeout(), TcpStream::connect(&addr))
            .await
            .map_err(|_| anyhow!("connect to {} timed out", addr))?
            .with_context(|| format!("failed to connect to {}", addr))?;
        socket.set_nodelay(true)?;

        let mut conn = NodeStream::new(socket);

        if let Some(password) = &self.config.password {
            let mut parts = vec![Bytes::from_static(b"AUTH")];
            if let Some(username) = &self.config.username {
                parts.push(Bytes::from(username.clone()));
            }
            parts.push(Bytes::from(password.clone()));
            conn.handshake(RespValue::command(parts)).await.context("AUTH failed")?;
        }

        if self.config.db != 0 {
            let select = RespValue::command([Bytes::from_static(b"SELECT"), Bytes::from(self.config.db.to_string())]);
            conn.handshake(select).await.context("SELECT failed")?;
        }

        *self.stream.get_mut() = Some(conn);
        info!("Connected to {}", addr);
        Ok(())
    }

    async fn call(&self, command: &[Bytes], args: &[Bytes]) -> anyhow::Result<Reply> {
        let frame = RespValue::command(command.iter().chain(args).cloned());

        let mut guard = self.stream.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("connection is not open"))?;

        let outcome = match self.config.command_timeout() {
            Some(limit) => timeout(limit, conn.request(&frame)).await.ok(),
            None => Some(conn.request(&frame).await),
        };

        let response = match outcome {
            Some(Ok(response)) => response,
            Some(Err(e)) => {
                // Unread or malformed bytes are left in the buffer, start over on reconnect
                warn!("Command failed on {}, dropping connection: {:#}", self.config.addr(), e);
                *guard = None;
                return Err(e);
            }
            None => {
                // The reply may still arrive later, the stream can't be reused
                warn!("Command timed out on {}, dropping connection", self.config.addr());
                *guard = None;
                bail!("command timed out");
            }
        };

        Reply::try_from(response).map_err(|message| anyhow!(message))
    }

    async fn quit(&mut self) -> anyhow::Result<()> {
        let mut conn = match self.stream.get_mut().take() {
            Some(conn) => conn,
            None => return Ok(()),
        };

        let quit = RespValue::command([Bytes::from_static(b"QUIT")]);
        conn.request(&quit).await?;
        info!("Disconnected from {}", self.config.addr());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[test]
    fn test_request_frames_command_and_reads_reply() {
        let mock = Builder::new()
            .write(b"*3\r\n$8\r\nJSON.GET\r\n$3\r\ndoc\r\n$1\r\n$\r\n")
            .read(b"$9\r\n[{\"a\":1}]\r\n")
            .build();

        let mut conn = NodeStream::new(mock);
        let frame = RespValue::command(["JSON.GET", "doc", "$"]);
        let reply = tokio_test::block_on(conn.request(&frame)).unwrap();

        let reply = Reply::try_from(reply).unwrap();
        assert_eq!(reply, Reply::str("[{\"a\":1}]"));
    }

    #[test]
    fn test_reply_split_across_reads() {
        let mock = Builder::new()
            .write(b"*1\r\n$4\r\nPING\r\n")
            .read(b"+PO")
            .read(b"NG\r\n")
            .build();

        let mut conn = NodeStream::new(mock);
        let reply = tokio_test::block_on(conn.request(&RespValue::command(["PING"]))).unwrap();
        assert_eq!(reply, RespValue::SimpleString("PONG".to_string()));
    }

    #[test]
    fn test_handshake_rejects_error_reply() {
        let mock = Builder::new()
            .write(b"*2\r\n$4\r\nAUTH\r\n$5\r\nwrong\r\n")
            .read(b"-WRONGPASS invalid password\r\n")
            .build();

        let mut conn = NodeStream::new(mock);
        let err = tokio_test::block_on(conn.handshake(RespValue::command(["AUTH", "wrong"]))).unwrap_err();
        assert!(err.to_string().contains("WRONGPASS"));
    }

    #[tokio::test]
    async fn test_malformed_reply_drops_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = BytesMut::with_capacity(1024);
            let mut replies = vec![&b"+PONG\r\n"[..], &b"?garbage\r\n"[..]];
            while let Some(reply) = replies.pop() {
                while RespParser::parse(&mut buf).unwrap().is_none() {
                    if socket.read_buf(&mut buf).await.unwrap() == 0 {
                        return;
                    }
                }
                socket.write_all(reply).await.unwrap();
            }
        });

        let mut transport = TcpTransport::new(NodeConfig::new(addr.ip().to_string(), addr.port()));
        transport.connect().await.unwrap();

        let ping = [Bytes::from("PING")];
        let first = transport.call(&ping, &[]).await.unwrap_err();
        assert!(first.to_string().contains("Unknown type prefix"));

        let second = transport.call(&ping, &[]).await.unwrap_err();
        assert_eq!(second.to_string(), "connection is not open");
    }

    #[test]
    fn test_error_reply_keeps_connection() {
        let mock = Builder::new()
            .write(b"*1\r\n$4\r\nPING\r\n")
            .read(b"-ERR busy\r\n")
            .write(b"*1\r\n$4\r\nPING\r\n")
            .read(b"+PONG\r\n")
            .build();

        let mut conn = NodeStream::new(mock);
        let frame = RespValue::command(["PING"]);
        let first = tokio_test::block_on(conn.request(&frame)).unwrap();
        assert_eq!(first, RespValue::Error("ERR busy".to_string()));
        let second = tokio_test::block_on(conn.request(&frame)).unwrap();
        assert_eq!(second, RespValue::SimpleString("PONG".to_string()));
    }

    #[tokio::test]
    async fn test_call_before_connect_fails() {
        let transport = TcpTransport::new(NodeConfig::default());
        let err = transport.call(&[Bytes::from("PING")], &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "connection is not open");
    }
}
