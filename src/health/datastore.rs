//! Relational datastore access for probes
//!
//! Every call opens a short-lived connection, runs one read-only statement
//! and closes it, all under the configured connect timeout.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{redact_url, DatabaseConfig};

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("Database not configured")]
    NotConfigured,
    #[error("Database connection failed: {0}")]
    Connect(String),
    #[error("Database query failed: {0}")]
    Query(String),
    #[error("Database check timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Datastore: Send + Sync + std::fmt::Debug {
    fn is_configured(&self) -> bool;

    /// Connection target with credentials redacted
    fn describe(&self) -> String;

    /// Round-trip `SELECT 1`, returning the elapsed time
    async fn ping(&self) -> Result<Duration, DatastoreError>;

    async fn tracked_locations(&self) -> Result<i64, DatastoreError>;

    async fn requests_last_hour(&self) -> Result<i64, DatastoreError>;
}

/// PostgreSQL datastore reached through sqlx
#[derive(Debug, Clone)]
pub struct PgDatastore {
    url: Option<String>,
    timeout: Duration,
}

impl PgDatastore {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone().filter(|u| !u.trim().is_empty()),
            timeout: config.connect_timeout(),
        }
    }

    async fn with_connection<T, F, Fut>(&self, op: F) -> Result<T, DatastoreError>
    where
        F: FnOnce(PgConnection) -> Fut,
        Fut: Future<Output = Result<(T, PgConnection), sqlx::Error>>,
    {
        let url = self.url.as_deref().ok_or(DatastoreError::NotConfigured)?;

        let work = async {
            let conn = PgConnection::connect(url)
                .await
                .map_err(|e| DatastoreError::Connect(e.to_string()))?;
            let (value, conn) = op(conn)
                .await
                .map_err(|e| DatastoreError::Query(e.to_string()))?;
            // Close failures do not change the answer
            let _ = conn.close().await;
            Ok(value)
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| DatastoreError::Timeout(self.timeout))?
    }

    async fn count(&self, sql: &'static str) -> Result<i64, DatastoreError> {
        self.with_connection(|mut conn| async move {
            let count: i64 = sqlx::query_scalar(sql).fetch_one(&mut conn).await?;
            Ok((count, conn))
        })
        .await
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    fn describe(&self) -> String {
        self.url.as_deref().map(redact_url).unwrap_or_default()
    }

    async fn ping(&self) -> Result<Duration, DatastoreError> {
        let started = Instant::now();
        self.with_connection(|mut conn| async move {
            sqlx::query("SELECT 1").execute(&mut conn).await?;
            Ok(((), conn))
        })
        .await?;
        Ok(started.elapsed())
    }

    async fn tracked_locations(&self) -> Result<i64, DatastoreError> {
        self.count("SELECT COUNT(DISTINCT location) FROM weather_data")
            .await
    }

    async fn requests_last_hour(&self) -> Result<i64, DatastoreError> {
        self.count(
            "SELECT COUNT(*) FROM weather_requests WHERE created_at > NOW() - INTERVAL '1 hour'",
        )
        .await
    }
}
