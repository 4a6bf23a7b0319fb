//! Error taxonomy for table drivers.
//!
//! Every failure surfaces to the immediate caller. Nothing here is retried or
//! swallowed; pooled connections are returned regardless of which variant is
//! produced.

use std::time::Duration;

use may_postgres::Error as PostgresError;
use thiserror::Error;

/// Errors produced while configuring a driver, building SQL, or running it.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Driver configuration does not fit the record shape (unknown order or
    /// primary key, empty table name).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The entity handed to a builder cannot produce a valid statement.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value cannot be rendered as a SQL literal, or a column cannot be
    /// decoded into a [`Value`](crate::Value).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// `PostgreSQL` error from `may_postgres`, propagated unchanged.
    #[error("PostgreSQL error: {0}")]
    Execution(#[from] PostgresError),

    /// Execution failure reported by a non-postgres connection.
    #[error("Query error: {0}")]
    Query(String),

    /// Connection string rejected or connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// No pooled connection became free within the configured timeout.
    #[error("Timed out after {0:?} waiting for a pooled connection")]
    PoolTimeout(Duration),

    /// The pool has been shut down.
    #[error("Connection pool is closed")]
    PoolClosed,

    /// A row could not be turned into the typed record.
    #[error("Decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::Configuration("unknown order key `nope`".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown order key `nope`");

        let err = DriverError::Validation("missing".to_string());
        assert!(err.to_string().contains("Validation error"));

        let err = DriverError::Serialization("NaN".to_string());
        assert!(err.to_string().contains("Serialization error"));

        let err = DriverError::PoolTimeout(Duration::from_secs(3));
        assert!(err.to_string().contains("3s"));

        assert_eq!(DriverError::PoolClosed.to_string(), "Connection pool is closed");
    }
}
