//! Fixed-size `may_postgres` pool.
//!
//! Idle clients sit in a bounded `crossbeam-channel`; acquiring is a
//! `recv_timeout` on it, releasing a `try_send` back. The channel doubles as
//! the wait queue when every client is checked out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use may_postgres::Client;

use crate::connection::connect;
use crate::error::{DriverError, Result};
use crate::executor::MayPostgresConnection;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
use crate::pool::config::DatabaseConfig;
use crate::pool::ConnectionPool;

pub struct PostgresPool {
    idle_tx: Sender<Client>,
    idle_rx: Receiver<Client>,
    acquire_timeout: Duration,
    size: usize,
    closed: AtomicBool,
}

impl PostgresPool {
    /// Wrap already-open clients.
    ///
    /// # Errors
    ///
    /// [`DriverError::Configuration`] when `clients` is empty.
    pub fn new(clients: Vec<Client>, acquire_timeout: Duration) -> Result<Self> {
        if clients.is_empty() {
            return Err(DriverError::Configuration(
                "a pool needs at least one connection".to_string(),
            ));
        }
        let size = clients.len();
        let (idle_tx, idle_rx) = bounded(size);
        for client in clients {
            // Capacity equals the number of clients; cannot be full.
            let _ = idle_tx.try_send(client);
        }
        log::info!("connection pool ready with {size} connection(s)");
        Ok(Self {
            idle_tx,
            idle_rx,
            acquire_timeout,
            size,
            closed: AtomicBool::new(false),
        })
    }

    /// Open `max_connections` clients against `url`.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let clients = (0..config.max_connections.max(1))
            .map(|_| connect(&config.url))
            .collect::<Result<Vec<_>>>()?;
        Self::new(clients, config.pool_timeout())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    /// Stop handing out connections and drop the idle ones. Connections
    /// still checked out are dropped when released.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let dropped = self.idle_rx.try_iter().count();
        log::info!("connection pool closed, dropped {dropped} idle connection(s)");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ConnectionPool for PostgresPool {
    type Connection = MayPostgresConnection;

    fn acquire(&self) -> Result<MayPostgresConnection> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::acquire_connection_span().entered();

        if self.is_closed() {
            return Err(DriverError::PoolClosed);
        }
        let start = Instant::now();
        let client = match self.idle_rx.recv_timeout(self.acquire_timeout) {
            Ok(client) => client,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("no connection freed up within {:?}", self.acquire_timeout);
                return Err(DriverError::PoolTimeout(self.acquire_timeout));
            }
            Err(RecvTimeoutError::Disconnected) => return Err(DriverError::PoolClosed),
        };

        let waited = start.elapsed();
        #[cfg(feature = "metrics")]
        METRICS.record_acquire_wait(waited);
        log::debug!("acquired connection after {waited:?}, {} idle", self.idle());

        Ok(MayPostgresConnection::new(client))
    }

    fn release(&self, conn: MayPostgresConnection) {
        if self.is_closed() {
            log::warn!("dropping connection returned to a closed pool");
            return;
        }
        match self.idle_tx.try_send(conn.into_client()) {
            Ok(()) => log::debug!("released connection, {} idle", self.idle()),
            Err(TrySendError::Full(_)) => {
                log::warn!("pool already holds {} idle connections, dropping extra", self.size);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("dropping connection returned to a disconnected pool");
            }
        }
    }
}
