//! Query metrics and tracing spans.
//!
//! With the `metrics` feature, counters and histograms are registered on the
//! global OpenTelemetry meter `entity_driver`; install a meter provider to
//! export them. With the `tracing` feature, execution and pool acquisition
//! run inside spans.

#[cfg(feature = "metrics")]
pub use otel::{DriverMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use std::time::Duration;

    use once_cell::sync::Lazy;
    use opentelemetry::global;
    use opentelemetry::metrics::{Counter, Histogram};

    pub static METRICS: Lazy<DriverMetrics> = Lazy::new(DriverMetrics::init);

    pub struct DriverMetrics {
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub acquire_wait_duration: Histogram<f64>,
    }

    impl DriverMetrics {
        pub fn init() -> Self {
            let meter = global::meter("entity_driver");

            let queries_total = meter
                .u64_counter("entity_driver_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_errors_total = meter
                .u64_counter("entity_driver_query_errors_total")
                .with_description("Statements that failed")
                .build();

            let query_duration = meter
                .f64_histogram("entity_driver_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            let acquire_wait_duration = meter
                .f64_histogram("entity_driver_pool_acquire_wait_seconds")
                .with_description("Time spent waiting for a pooled connection")
                .build();

            Self {
                queries_total,
                query_errors_total,
                query_duration,
                acquire_wait_duration,
            }
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_acquire_wait(&self, waited: Duration) {
            self.acquire_wait_duration.record(waited.as_secs_f64(), &[]);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    pub fn execute_query_span(sql: &str) -> Span {
        info_span!("entity_driver.query", db.system = "postgresql", db.statement = sql)
    }

    pub fn acquire_connection_span() -> Span {
        info_span!("entity_driver.acquire")
    }

    pub fn connect_span() -> Span {
        info_span!("entity_driver.connect", db.system = "postgresql")
    }
}
