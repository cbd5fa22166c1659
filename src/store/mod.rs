// Store module - values, rows, and the connection to the relational store
// The store is an external SQLite database reached through a file path
//
// Every lookup opens its own short-lived connection and releases it when done:
// 1. No shared state: concurrent callers never contend on a handle
// 2. Guaranteed release: the connection is dropped on every exit path (RAII)
// 3. Simplicity: pooling and retry policy stay with the caller

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How long to wait (in milliseconds) if a writer holds the database locked
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration for reaching the store
/// How this gets loaded (file, environment, hardcoded) is up to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Busy timeout in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl StoreConfig {
    /// Create a configuration pointing at a database file, with default timeouts
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Open a read-only connection to the store
/// Lookups never write, so we refuse write access up front
/// The caller owns the connection; dropping it closes the handle
pub(crate) fn open_read_only(config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        &config.path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(conn)
}

/// Represents a scalar value the store can hold
/// The variants mirror SQLite's storage classes one-to-one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Parse a literal as typed by a user, e.g. on the command line
    ///
    /// Single quotes force text ('42' stays text), otherwise we try integer,
    /// then real, and fall back to text. Whatever comes out is still only
    /// ever used as a bound parameter - a hostile literal is harmless here.
    pub fn parse_literal(input: &str) -> Value {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return Value::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(r) = trimmed.parse::<f64>() {
            return Value::Real(r);
        }
        Value::Text(trimmed.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<{} byte blob>", b.len()),
        }
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

// Decoding: how a raw SQLite column value becomes our Value
impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

// Binding: how our Value travels to the store as a statement parameter
// This is the mechanism that keeps untrusted values out of query text
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// Represents a single row returned by a lookup
/// Columns keep the order the store returned them in
/// A Row is an immutable snapshot - it holds no connection or cursor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    /// (column name, value) pairs in store order
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Get the number of columns in this row
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal_types() {
        assert_eq!(Value::parse_literal("42"), Value::Integer(42));
        assert_eq!(Value::parse_literal("-7"), Value::Integer(-7));
        assert_eq!(Value::parse_literal("2.5"), Value::Real(2.5));
        assert_eq!(Value::parse_literal("alice"), Value::Text("alice".to_string()));
        assert_eq!(Value::parse_literal("NULL"), Value::Null);
    }

    #[test]
    fn test_parse_literal_quotes_force_text() {
        assert_eq!(Value::parse_literal("'42'"), Value::Text("42".to_string()));
        assert_eq!(Value::parse_literal(" 'alice' "), Value::Text("alice".to_string()));
        // Empty quoted string is empty text, not null
        assert_eq!(Value::parse_literal("''"), Value::Text(String::new()));
    }

    #[test]
    fn test_row_get_by_name() {
        let row = Row {
            columns: vec![
                ("id".to_string(), Value::Integer(1)),
                ("name".to_string(), Value::Text("alice".to_string())),
            ],
        };

        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("name"), Some(&Value::Text("alice".to_string())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }
}
