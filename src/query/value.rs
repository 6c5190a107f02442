use super::Query;
use super::lookup::Lookup;
use chrono::{NaiveDateTime, Timelike};
use std::collections::BTreeSet;

/// Characters that must be backslash-escaped inside a quoted term
const SPECIAL_CHARS: &str = "+-&|!(){}[]^\"~*?:\\";

/// A value a query can match against
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Timestamp(NaiveDateTime),
    Int(i64),
    Float(f64),
    Text(String),
    /// Ordered values, joined by the caster in the order given
    List(Vec<Value>),
    /// A nested query embedded verbatim
    Expr(Box<Query>),
}

impl Value {
    /// Whether this value counts as "no query supplied" for free text
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

/// Backslash-escape every query-syntax character in `s`
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if SPECIAL_CHARS.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Cast a value into its textual token.
///
/// Booleans and timestamps are quoted as-is, lists are joined element by
/// element, nested queries are embedded verbatim and everything else is
/// escaped and quoted as a phrase. `startswith`/`endswith` wildcards go
/// inside the quotes, after escaping.
pub fn cast(value: &Value, lookup: Option<Lookup>) -> String {
    match value {
        Value::Bool(b) => format!("\"{b}\""),
        Value::Timestamp(ts) => format!("\"{}\"", format_timestamp(ts)),
        Value::List(items) => items
            .iter()
            .map(|item| cast(item, None))
            .collect::<Vec<_>>()
            .join(Lookup::list_separator(lookup)),
        Value::Expr(query) => query.render(),
        Value::Int(n) => quote_scalar(&n.to_string(), lookup),
        Value::Float(x) => quote_scalar(&format_float(*x), lookup),
        Value::Text(text) => quote_scalar(text, lookup),
    }
}

fn quote_scalar(raw: &str, lookup: Option<Lookup>) -> String {
    let escaped = escape(raw);
    match lookup {
        Some(Lookup::StartsWith) => format!("\"{escaped}*\""),
        Some(Lookup::EndsWith) => format!("\"*{escaped}\""),
        _ => format!("\"{escaped}\""),
    }
}

/// ISO-8601 without offset; sub-second precision only when present
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Query> for Value {
    fn from(query: Query) -> Self {
        Value::Expr(Box::new(query))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

// Sorted order keeps the rendered join deterministic.
impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
