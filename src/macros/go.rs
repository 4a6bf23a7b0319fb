/// Run a driver call on a fresh `may` coroutine and wait for its result.
///
/// The expression is moved into the coroutine, so clone any `Arc`ed driver
/// first. A panic inside the coroutine comes back as [`DriverError::Query`](crate::DriverError::Query).
///
/// ```no_run
/// # use std::sync::Arc;
/// # use entity_driver::{driver_go, TableDriver, PostgresPool, Record, DriverError};
/// # fn demo<R: Record + 'static>(pages: Arc<TableDriver<R, PostgresPool>>) -> Result<(), DriverError> {
/// let driver = Arc::clone(&pages);
/// let total = driver_go!(driver.count_all())?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! driver_go {
    ($body:expr) => {{
        let handle = $crate::may::go!(move || $body);
        match handle.join() {
            Ok(result) => result,
            Err(panic) => Err($crate::DriverError::Query(format!(
                "coroutine panicked: {:?}",
                panic
            ))),
        }
    }};
}
