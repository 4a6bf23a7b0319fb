//! Scalar field values and their rendering as SQL literals.
//!
//! Values are embedded into statements as escaped literals rather than bound
//! parameters, so [`Value::to_sql_literal`] is the only thing standing between
//! caller data and the statement text. Text is single-quoted with embedded
//! quotes doubled; NUL bytes are refused outright since PostgreSQL cannot
//! store them and truncation would change the statement.

use chrono::NaiveDateTime;

use crate::error::{DriverError, Result};

/// Timestamp layout used for literals: 24-hour clock, no zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field value of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Wall-clock time exactly as provided; no timezone conversion is applied.
    Timestamp(NaiveDateTime),
    Null,
}

impl Value {
    /// Render this value as a SQL literal.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Serialization`] for non-finite floats and text
    /// containing a NUL byte.
    pub fn to_sql_literal(&self) -> Result<String> {
        match self {
            Value::Text(s) => quote(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(DriverError::Serialization(format!(
                        "cannot render non-finite number {f} as a SQL literal"
                    )));
                }
                Ok(f.to_string())
            }
            Value::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Value::Timestamp(ts) => quote(&format_timestamp(ts)),
            Value::Null => Ok("NULL".to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Double every single quote so the text can sit inside a `'...'` literal.
pub fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn quote(s: &str) -> Result<String> {
    if s.contains('\0') {
        return Err(DriverError::Serialization(
            "text values may not contain NUL bytes".to_string(),
        ));
    }
    Ok(format!("'{}'", escape_string(s)))
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
