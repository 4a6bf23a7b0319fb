//! Connection pooling.
//!
//! Drivers only need [`ConnectionPool`]: hand out one connection, take it
//! back. [`PostgresPool`] is the `may_postgres` implementation; anything that
//! queues callers when exhausted can stand in for it.

pub mod config;
pub mod manager;

use std::sync::Arc;

use crate::error::Result;
use crate::executor::Connection;

pub use config::DatabaseConfig;
pub use manager::PostgresPool;

/// Source of connections for [`TableDriver`](crate::TableDriver).
pub trait ConnectionPool {
    type Connection: Connection;

    /// Take a connection, blocking the calling coroutine while none is free.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::PoolTimeout`](crate::DriverError::PoolTimeout)
    /// or [`DriverError::PoolClosed`](crate::DriverError::PoolClosed).
    fn acquire(&self) -> Result<Self::Connection>;

    /// Return a connection taken with [`acquire`](Self::acquire).
    fn release(&self, conn: Self::Connection);
}

impl<P: ConnectionPool + ?Sized> ConnectionPool for Arc<P> {
    type Connection = P::Connection;

    fn acquire(&self) -> Result<Self::Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Self::Connection) {
        (**self).release(conn);
    }
}

impl<P: ConnectionPool + ?Sized> ConnectionPool for &P {
    type Connection = P::Connection;

    fn acquire(&self) -> Result<Self::Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Self::Connection) {
        (**self).release(conn);
    }
}
