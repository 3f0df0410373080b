use crate::adapters::database::DbPool;
use crate::config::HealthConfig;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::time::Duration;
use tokio::time::timeout;

const STORE_COMPONENT: &str = "database";

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("flamr-server");
        Self {
            status: meter
                .i64_gauge("flamr_health_status")
                .with_description("1 while a backing component answers its readiness probe, 0 otherwise")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the swipe/match/message store failed its readiness probe.
#[derive(Debug, thiserror::Error)]
pub enum StoreProbeError {
    #[error("store unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),
    #[error("store did not answer within {0:?}")]
    TimedOut(Duration),
}

/// Readiness checks for the listeners. Only Postgres backs the core; presence is in-process.
#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
    probe_timeout: Duration,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(pool: DbPool, config: HealthConfig) -> Self {
        Self { pool, probe_timeout: Duration::from_millis(config.db_timeout_ms), metrics: Metrics::new() }
    }

    /// Round-trips a trivial query through the pool.
    ///
    /// # Errors
    /// Returns `StoreProbeError` when the query fails or exceeds the probe timeout.
    pub async fn check_store(&self) -> Result<(), StoreProbeError> {
        let probe = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        let outcome = match timeout(self.probe_timeout, probe).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StoreProbeError::Unreachable(e)),
            Err(_) => Err(StoreProbeError::TimedOut(self.probe_timeout)),
        };

        let up = i64::from(outcome.is_ok());
        self.metrics.status.record(up, &[KeyValue::new("component", STORE_COMPONENT)]);
        outcome
    }
}
