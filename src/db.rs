use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{
    config::DatabaseConfig,
    error::{AppError, StoreError},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// No connections are held open when idle; they are closed after
/// `IDLE_TIMEOUT`.
fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(0)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .acquire_timeout(CONNECT_TIMEOUT)
}

/// Open the pool and check the database answers within the connect timeout.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = pool_options(cfg)
        .connect_lazy(&cfg.url)
        .context("parse database url")?;

    tokio::time::timeout(CONNECT_TIMEOUT, sqlx::query("SELECT 1").execute(&pool))
        .await
        .context("database ping timed out")?
        .context("database ping")?;

    info!(max_connections = cfg.max_connections, "database connected");
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")
}

/// Bound a store call by the request deadline.
///
/// The future is dropped on expiry, and it is also dropped when the
/// surrounding request future goes away, so in-flight store work is
/// cancelled either way.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(res) => res.map_err(AppError::from),
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "store call timed out");
            Err(AppError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_keeps_no_idle_floor() {
        let cfg = DatabaseConfig {
            url: "postgres://localhost/test".into(),
            max_connections: 25,
        };
        let opts = pool_options(&cfg);
        assert_eq!(opts.get_max_connections(), 25);
        assert_eq!(opts.get_min_connections(), 0);
        assert_eq!(opts.get_idle_timeout(), Some(IDLE_TIMEOUT));
        assert_eq!(opts.get_max_lifetime(), Some(MAX_LIFETIME));
    }

    #[tokio::test]
    async fn deadline_passes_results_through() {
        let got = with_deadline(Duration::from_millis(100), async { Ok::<_, StoreError>(5) })
            .await
            .unwrap();
        assert_eq!(got, 5);
    }

    #[tokio::test]
    async fn deadline_expiry_is_timeout() {
        let err = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }

    #[tokio::test]
    async fn store_errors_become_internal() {
        let err = with_deadline(Duration::from_millis(100), async {
            Err::<(), _>(StoreError::Database(sqlx::Error::PoolTimedOut))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
