//! Reply normalization
//!
//! Module commands answer with flat sequences that mix key/value streams,
//! plain lists and lists of lists, with no type tag telling them apart. The
//! normalizer guesses the intended shape from the sequence itself: length
//! parity, whether every element is a sequence, and single-element wrapping.
//! The rules are applied in a fixed order, first match wins.

use super::{Reply, Value};

/// Turns raw replies into structured values
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Return replies untouched
    raw_response: bool,
}

impl Normalizer {
    /// Create a normalizer; `raw_response` disables every rule
    pub fn new(raw_response: bool) -> Self {
        Normalizer { raw_response }
    }

    /// Normalize one reply
    pub fn normalize(&self, reply: Reply) -> Value {
        if self.raw_response {
            return Value::from(reply);
        }
        normalize_reply(reply)
    }
}

fn normalize_reply(reply: Reply) -> Value {
    let mut items = match reply {
        Reply::Array(items) => items,
        scalar => return Value::from(scalar),
    };

    let rectangular = is_rectangular(&items);

    // Odd-length flat list, not a key/value stream
    if items.len() > 1 && items.len() % 2 == 1 && !rectangular {
        return Value::from(Reply::Array(items));
    }

    if items.is_empty() {
        return Value::List(Vec::new());
    }

    if items.len() == 1 {
        return normalize_reply(items.swap_remove(0));
    }

    if rectangular {
        return normalize_reply(Reply::Array(flatten(items)));
    }

    let mut entries = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let Some(key) = iter.next() {
        let value = match iter.next() {
            Some(value) => value,
            None => break,
        };
        if matches!(&value, Reply::Str(s) if s.is_empty()) {
            continue;
        }

        let value = match value {
            Reply::Array(inner) if is_rectangular(&inner) => {
                Value::List(flatten(inner).into_iter().map(Value::from).collect())
            }
            nested @ Reply::Array(_) => normalize_reply(nested),
            scalar => Value::from(scalar),
        };
        Value::insert_entry(&mut entries, key.key_string(), value);
    }

    Value::Map(entries)
}

/// Every element is itself a sequence (vacuously true when empty)
fn is_rectangular(items: &[Reply]) -> bool {
    items.iter().all(Reply::is_array)
}

/// Concatenate the inner sequences of a rectangular sequence
fn flatten(items: Vec<Reply>) -> Vec<Reply> {
    items
        .into_iter()
        .flat_map(|item| match item {
            Reply::Array(inner) => inner,
            other => vec![other],
        })
        .collect()
}
