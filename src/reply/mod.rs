//! Reply types
//!
//! `Reply` is what the store sent back for one command, `Value` is what the
//! normalizer turns it into for application code.

mod normalize;

pub use normalize::Normalizer;

use crate::protocol::RespValue;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Raw reply returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Null bulk string or null array
    Nil,

    /// Integer reply
    Int(i64),

    /// Simple or bulk string reply
    Str(String),

    /// Sequence of replies
    Array(Vec<Reply>),
}

impl Reply {
    /// Create a string reply
    pub fn str(s: impl Into<String>) -> Self {
        Reply::Str(s.into())
    }

    /// Check if this is a sequence
    pub fn is_array(&self) -> bool {
        matches!(self, Reply::Array(_))
    }

    /// Try to extract the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract the integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render the reply the way it is used as a mapping key
    ///
    /// Arrays join their elements with `,`; a nil element inside an array
    /// renders as an empty string.
    pub(crate) fn key_string(&self) -> String {
        match self {
            Reply::Nil => "null".to_string(),
            Reply::Int(i) => i.to_string(),
            Reply::Str(s) => s.clone(),
            Reply::Array(items) => items
                .iter()
                .map(|item| match item {
                    Reply::Nil => String::new(),
                    other => other.key_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl TryFrom<RespValue> for Reply {
    type Error = String;

    /// Error replies anywhere in the tree are reported as the error message
    fn try_from(value: RespValue) -> Result<Self, Self::Error> {
        match value {
            RespValue::SimpleString(s) => Ok(Reply::Str(s)),
            RespValue::BulkString(bytes) => Ok(Reply::Str(String::from_utf8_lossy(&bytes).into_owned())),
            RespValue::Integer(i) => Ok(Reply::Int(i)),
            RespValue::Null => Ok(Reply::Nil),
            RespValue::Error(message) => Err(message),
            RespValue::Array(items) => items
                .into_iter()
                .map(Reply::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Reply::Array),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Int(i) => write!(f, "{}", i),
            Reply::Str(s) => write!(f, "{:?}", s),
            Reply::Array(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Structured result produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null scalar
    Nil,

    /// Integer scalar
    Int(i64),

    /// String scalar
    Str(String),

    /// Ordered list
    List(Vec<Value>),

    /// Key/value mapping, keys unique, insertion order preserved
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Try to extract the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract the integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to extract list elements
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a mapping
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Check if this is a mapping
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Convert into a `serde_json::Value`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => serde_json::Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Insert into a mapping entry list, replacing the value of an existing key in place
    pub(crate) fn insert_entry(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }
}

impl From<Reply> for Value {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Nil => Value::Nil,
            Reply::Int(i) => Value::Int(i),
            Reply::Str(s) => Value::Str(s),
            Reply::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
