//! RESP2 parser and encoder
//!
//! The encoder turns a command into a request frame; the parser turns the bytes
//! read from the socket back into a `RespValue`.

use super::types::{RespValue, RespError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// RESP2 Parser
pub struct RespParser;

impl RespParser {
    /// Parse one reply from the front of the buffer
    ///
    /// Returns Ok(Some(value)) and consumes the bytes if a complete value was
    /// available, Ok(None) without consuming anything if more data is needed,
    /// Err(e) if the data is not valid RESP2.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        match Self::parse_at(buf, 0)? {
            Some((value, consumed)) => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Parse a value starting at `pos`, returning it with the position right after it
    fn parse_at(buf: &[u8], pos: usize) -> Result<Option<(RespValue, usize)>, RespError> {
        let (line, next) = match Self::line_at(buf, pos) {
            Some(found) => found,
            None => return Ok(None),
        };

        if line.is_empty() {
            return Err(RespError::InvalidProtocol("empty line".to_string()));
        }

        let body = &line[1..];
        match line[0] {
            b'+' => Ok(Some((RespValue::SimpleString(Self::utf8(body)?), next))),
            b'-' => Ok(Some((RespValue::Error(Self::utf8(body)?), next))),
            b':' => Ok(Some((RespValue::Integer(Self::integer(body)?), next))),
            b'$' => Self::parse_bulk_string(buf, Self::integer(body)?, next),
            b'*' => Self::parse_array(buf, Self::integer(body)?, next),
            other => Err(RespError::InvalidProtocol(
                format!("Unknown type prefix: {}", other as char)
            )),
        }
    }

    /// Bulk string payload: $6\r\nfoobar\r\n or $-1\r\n (null)
    fn parse_bulk_string(buf: &[u8], len: i64, start: usize) -> Result<Option<(RespValue, usize)>, RespError> {
        if len == -1 {
            return Ok(Some((RespValue::Null, start)));
        }
        if len < 0 {
            return Err(RespError::InvalidProtocol(
                format!("Invalid bulk string length: {}", len)
            ));
        }

        let end = start + len as usize;
        if buf.len() < end + 2 {
            return Ok(None);
        }
        if &buf[end..end + 2] != CRLF {
            return Err(RespError::InvalidProtocol(
                "Missing CRLF after bulk string data".to_string()
            ));
        }

        let data = Bytes::copy_from_slice(&buf[start..end]);
        Ok(Some((RespValue::BulkString(data), end + 2)))
    }

    /// Array elements: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n (null)
    fn parse_array(buf: &[u8], count: i64, start: usize) -> Result<Option<(RespValue, usize)>, RespError> {
        if count == -1 {
            return Ok(Some((RespValue::Null, start)));
        }
        if count < 0 {
            return Err(RespError::InvalidProtocol(
                format!("Invalid array count: {}", count)
            ));
        }

        let mut elements = Vec::with_capacity(count.min(1024) as usize);
        let mut pos = start;
        for _ in 0..count {
            match Self::parse_at(buf, pos)? {
                Some((value, next)) => {
                    elements.push(value);
                    pos = next;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((RespValue::Array(elements), pos)))
    }

    /// Find the line starting at `pos`; returns it without CRLF plus the offset after CRLF
    fn line_at(buf: &[u8], pos: usize) -> Option<(&[u8], usize)> {
        let rest = buf.get(pos..)?;
        let idx = rest.windows(2).position(|w| w == CRLF)?;
        Some((&rest[..idx], pos + idx + 2))
    }

    fn utf8(bytes: &[u8]) -> Result<String, RespError> {
        String::from_utf8(bytes.to_vec()).map_err(|_| RespError::InvalidUtf8)
    }

    fn integer(bytes: &[u8]) -> Result<i64, RespError> {
        let s = std::str::from_utf8(bytes).map_err(|_| RespError::InvalidUtf8)?;
        s.parse::<i64>().map_err(|_| RespError::IntegerOverflow)
    }
}

/// RESP2 Encoder
pub struct RespEncoder;

impl RespEncoder {
    /// Encode a RESP value to bytes
    pub fn encode(value: &RespValue) -> Bytes {
        let mut buf = BytesMut::new();
        Self::encode_to(&mut buf, value);
        buf.freeze()
    }

    /// Encode a RESP value into an existing buffer
    pub fn encode_to(buf: &mut BytesMut, value: &RespValue) {
        match value {
            RespValue::SimpleString(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Error(e) => {
                buf.put_u8(b'-');
                buf.put_slice(e.as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::Integer(i) => {
                buf.put_u8(b':');
                buf.put_slice(i.to_string().as_bytes());
                buf.put_slice(CRLF);
            }
            RespValue::BulkString(bytes) => {
                buf.put_u8(b'$');
                buf.put_slice(bytes.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                buf.put_slice(bytes);
                buf.put_slice(CRLF);
            }
            RespValue::Null => {
                buf.put_slice(b"$-1\r\n");
            }
            RespValue::Array(arr) => {
                buf.put_u8(b'*');
                buf.put_slice(arr.len().to_string().as_bytes());
                buf.put_slice(CRLF);
                for elem in arr {
                    Self::encode_to(buf, elem);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_string() {
        let mut buf = BytesMut::from("+OK\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::SimpleString("OK".to_string())));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let mut buf = BytesMut::from("-ERR unknown command 'JSON.SET'\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Error("ERR unknown command 'JSON.SET'".to_string())));
    }

    #[test]
    fn test_parse_null_bulk_and_null_array() {
        let mut buf = BytesMut::from("$-1\r\n*-1\r\n");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Null));
        assert_eq!(RespParser::parse(&mut buf).unwrap(), Some(RespValue::Null));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_nested_array() {
        let mut buf = BytesMut::from("*2\r\n*2\r\n$1\r\na\r\n:1\r\n*0\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Array(vec![
            RespValue::Array(vec![
                RespValue::BulkString(Bytes::from("a")),
                RespValue::Integer(1),
            ]),
            RespValue::Array(vec![]),
        ])));
    }

    #[test]
    fn test_partial_reply_is_not_consumed() {
        let mut buf = BytesMut::from("*2\r\n$3\r\nfoo\r\n$3\r\nba");
        assert_eq!(RespParser::parse(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 19);

        buf.extend_from_slice(b"r\r\n");
        let result = RespParser::parse(&mut buf).unwrap();
        assert_eq!(result, Some(RespValue::Array(vec![
            RespValue::BulkString(Bytes::from("foo")),
            RespValue::BulkString(Bytes::from("bar")),
        ])));
    }

    #[test]
    fn test_unknown_prefix_is_rejected() {
        let mut buf = BytesMut::from("?what\r\n");
        assert!(matches!(RespParser::parse(&mut buf), Err(RespError::InvalidProtocol(_))));
    }

    #[test]
    fn test_encode_command_frame() {
        let frame = RespValue::command(["BF.ADD", "filter", "item"]);
        let encoded = RespEncoder::encode(&frame);
        assert_eq!(
            encoded,
            Bytes::from("*3\r\n$6\r\nBF.ADD\r\n$6\r\nfilter\r\n$4\r\nitem\r\n")
        );
    }
}
