//! Statement execution over a checked-out connection.
//!
//! Statements reach the connection as finished SQL text with every value
//! already inlined, so neither method takes bind parameters.

use std::time::Instant;

use may_postgres::Client;

use crate::entity::Entity;
use crate::error::{DriverError, Result};
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
use crate::row::row_to_entity;

/// A single database connection as seen by a [`TableDriver`](crate::TableDriver).
pub trait Connection {
    /// Run a statement and return the number of rows affected.
    ///
    /// # Errors
    ///
    /// Propagates the underlying execution error unchanged.
    fn execute(&self, sql: &str) -> Result<u64>;

    /// Run a query and return its rows keyed by column name.
    ///
    /// # Errors
    ///
    /// Propagates the underlying execution error unchanged, or
    /// [`DriverError::Serialization`] for a column type that has no
    /// [`Value`](crate::Value) counterpart.
    fn query_all(&self, sql: &str) -> Result<Vec<Entity>>;
}

/// [`Connection`] backed by a `may_postgres::Client`.
pub struct MayPostgresConnection {
    client: Client,
}

impl MayPostgresConnection {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn into_client(self) -> Client {
        self.client
    }
}

impl Connection for MayPostgresConnection {
    fn execute(&self, sql: &str) -> Result<u64> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();
        log::debug!("execute: {sql}");

        let start = Instant::now();
        let result = self.client.execute(sql, &[]).map_err(|e| {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            DriverError::Execution(e)
        });

        #[cfg(feature = "metrics")]
        METRICS.record_query_duration(start.elapsed());
        #[cfg(not(feature = "metrics"))]
        let _ = start;

        result
    }

    fn query_all(&self, sql: &str) -> Result<Vec<Entity>> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();
        log::debug!("query: {sql}");

        let start = Instant::now();
        let result = self.client.query(sql, &[]).map_err(|e| {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            DriverError::Execution(e)
        });

        #[cfg(feature = "metrics")]
        METRICS.record_query_duration(start.elapsed());
        #[cfg(not(feature = "metrics"))]
        let _ = start;

        result?.iter().map(row_to_entity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockPool, MockResponse};
    use crate::ConnectionPool;

    #[test]
    fn test_mock_connection_follows_script() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Affected(3));
        pool.push_response(MockResponse::Error("duplicate key".to_string()));

        let conn = pool.acquire().unwrap();
        assert_eq!(conn.execute("DELETE FROM schema.t WHERE a=1;").unwrap(), 3);
        let err = conn.query_all("SELECT 1;").unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
        pool.release(conn);

        assert_eq!(pool.statements().len(), 2);
    }
}
