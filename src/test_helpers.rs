//! In-memory pool for exercising drivers without a database.
//!
//! [`MockPool`] counts every acquire and release, records each statement it
//! is given, and answers from a FIFO script of [`MockResponse`]s. Clones
//! share state, so a test can keep one handle and give another to the driver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::entity::Entity;
use crate::error::{DriverError, Result};
use crate::executor::Connection;
use crate::pool::ConnectionPool;

/// Scripted answer to the next statement.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows(Vec<Entity>),
    Affected(u64),
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    acquired: usize,
    released: usize,
    fail_next_acquire: bool,
    statements: Vec<String>,
    responses: VecDeque<MockResponse>,
}

#[derive(Debug, Clone, Default)]
pub struct MockPool {
    state: Arc<Mutex<MockState>>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: MockResponse) {
        lock(&self.state).responses.push_back(response);
    }

    /// Make the next `acquire` fail with a pool timeout.
    pub fn fail_next_acquire(&self) {
        lock(&self.state).fail_next_acquire = true;
    }

    pub fn acquired(&self) -> usize {
        lock(&self.state).acquired
    }

    pub fn released(&self) -> usize {
        lock(&self.state).released
    }

    /// Connections currently checked out.
    pub fn outstanding(&self) -> usize {
        let state = lock(&self.state);
        state.acquired - state.released
    }

    pub fn statements(&self) -> Vec<String> {
        lock(&self.state).statements.clone()
    }
}

pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    fn next(&self, sql: &str) -> Option<MockResponse> {
        let mut state = lock(&self.state);
        state.statements.push(sql.to_string());
        state.responses.pop_front()
    }
}

impl Connection for MockConnection {
    /// Unscripted statements affect one row.
    fn execute(&self, sql: &str) -> Result<u64> {
        match self.next(sql) {
            None => Ok(1),
            Some(MockResponse::Affected(n)) => Ok(n),
            Some(MockResponse::Rows(rows)) => Ok(rows.len() as u64),
            Some(MockResponse::Error(msg)) => Err(DriverError::Query(msg)),
        }
    }

    /// Unscripted queries return no rows.
    fn query_all(&self, sql: &str) -> Result<Vec<Entity>> {
        match self.next(sql) {
            None | Some(MockResponse::Affected(_)) => Ok(Vec::new()),
            Some(MockResponse::Rows(rows)) => Ok(rows),
            Some(MockResponse::Error(msg)) => Err(DriverError::Query(msg)),
        }
    }
}

impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    fn acquire(&self) -> Result<MockConnection> {
        let mut state = lock(&self.state);
        if std::mem::take(&mut state.fail_next_acquire) {
            return Err(DriverError::PoolTimeout(Duration::ZERO));
        }
        state.acquired += 1;
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }

    fn release(&self, _conn: MockConnection) {
        lock(&self.state).released += 1;
    }
}
