//! Command parameters
//!
//! `Param` is anything a command builder can pass to the store. It is used two
//! ways: as separate protocol arguments (`append_args`), or rendered inline as a
//! quoted literal inside a larger argument (`stringify`), e.g. graph query
//! parameters.

use bytes::Bytes;

/// A value passed to a command
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Absent value
    Null,

    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Floating point number
    Float(f64),

    /// String
    Str(String),

    /// Sequence of parameters
    List(Vec<Param>),
}

impl Param {
    /// Append this parameter as protocol arguments
    ///
    /// Lists are flattened into consecutive arguments; `Null` is sent as an
    /// empty argument.
    pub fn append_args(&self, out: &mut Vec<Bytes>) {
        match self {
            Param::Null => out.push(Bytes::new()),
            Param::Bool(b) => out.push(Bytes::from(b.to_string())),
            Param::Int(i) => out.push(Bytes::from(i.to_string())),
            Param::Float(f) => out.push(Bytes::from(f.to_string())),
            Param::Str(s) => out.push(Bytes::from(s.clone())),
            Param::List(items) => {
                for item in items {
                    item.append_args(out);
                }
            }
        }
    }
}

/// Render a parameter as an inline literal
///
/// Strings have `\`, `"` and `'` escaped with a backslash and are wrapped in
/// single quotes; lists become `[a, b]`; `Null` becomes `null`; numbers and
/// booleans are rendered as-is.
pub fn stringify(param: &Param) -> String {
    match param {
        Param::Null => "null".to_string(),
        Param::Bool(b) => b.to_string(),
        Param::Int(i) => i.to_string(),
        Param::Float(f) => f.to_string(),
        Param::Str(s) => quote(s),
        Param::List(items) => {
            let rendered: Vec<String> = items.iter().map(stringify).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

fn quote(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        if matches!(ch, '\\' | '"' | '\'') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    let mut out = String::with_capacity(escaped.len() + 2);
    if !escaped.starts_with('"') {
        out.push('\'');
    }
    out.push_str(&escaped);
    if !escaped.ends_with('"') || escaped.ends_with("\\\"") {
        out.push('\'');
    }
    out
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Str(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Str(s)
    }
}

impl From<&String> for Param {
    fn from(s: &String) -> Self {
        Param::Str(s.clone())
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<i32> for Param {
    fn from(i: i32) -> Self {
        Param::Int(i as i64)
    }
}

impl From<i64> for Param {
    fn from(i: i64) -> Self {
        Param::Int(i)
    }
}

impl From<u32> for Param {
    fn from(i: u32) -> Self {
        Param::Int(i as i64)
    }
}

impl From<u64> for Param {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(v) => Param::Int(v),
            Err(_) => Param::Str(i.to_string()),
        }
    }
}

impl From<usize> for Param {
    fn from(i: usize) -> Self {
        Param::from(i as u64)
    }
}

impl From<f64> for Param {
    fn from(f: f64) -> Self {
        Param::Float(f)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Param::Null,
        }
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(items: Vec<T>) -> Self {
        Param::List(items.into_iter().map(Into::into).collect())
    }
}

/// Build a `Vec<Param>` from heterogeneous values
#[macro_export]
macro_rules! params {
    () => { Vec::<$crate::params::Param>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::params::Param::from($value)),+]
    };
}
