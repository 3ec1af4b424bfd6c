//! sqlx-backed pool implementations and the stock pool factories.
//!
//! These are the concrete collaborators behind the broker's pool contracts:
//! one driver-specific pool per backend, chosen by URL scheme.

use crate::broker::factory::PoolFactory;
use crate::config::BackendParameters;
use crate::error::PoolError;
use crate::pool::{BackendConnection, ClosablePool, ConnectionPool};
use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{MySql, MySqlPool, PgPool, Postgres, Sqlite, SqlitePool};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Driver-specific pool behind the broker's [`ConnectionPool`] contract.
#[derive(Debug, Clone)]
pub enum SqlxPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    SQLite(SqlitePool),
}

#[async_trait]
impl ConnectionPool for SqlxPool {
    async fn borrow(&self) -> Result<Box<dyn BackendConnection>, PoolError> {
        let conn = match self {
            SqlxPool::MySql(pool) => SqlxConnection::MySql(pool.acquire().await?),
            SqlxPool::Postgres(pool) => SqlxConnection::Postgres(pool.acquire().await?),
            SqlxPool::SQLite(pool) => SqlxConnection::SQLite(pool.acquire().await?),
        };
        Ok(Box::new(conn))
    }

    fn as_closable(&self) -> Option<&dyn ClosablePool> {
        Some(self)
    }
}

#[async_trait]
impl ClosablePool for SqlxPool {
    async fn close(&self) -> Result<(), PoolError> {
        match self {
            SqlxPool::MySql(pool) => pool.close().await,
            SqlxPool::Postgres(pool) => pool.close().await,
            SqlxPool::SQLite(pool) => pool.close().await,
        }
        Ok(())
    }
}

/// Driver-specific connection handed out by [`SqlxPool`]. Dropping it returns
/// the connection to its pool.
pub enum SqlxConnection {
    MySql(PoolConnection<MySql>),
    Postgres(PoolConnection<Postgres>),
    SQLite(PoolConnection<Sqlite>),
}

impl BackendConnection for SqlxConnection {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Lifetime policy a factory applies on top of the configured sizing.
struct LifetimePolicy {
    idle_timeout: Option<Duration>,
    max_lifetime: Option<Duration>,
    test_before_acquire: bool,
}

/// Connect one sqlx pool for a named backend, dispatching on URL scheme.
async fn connect_pool(
    name: &str,
    params: &BackendParameters,
    policy: LifetimePolicy,
) -> Result<SqlxPool, PoolError> {
    let url = params.connect_url()?;
    let sizing = &params.pool;
    sizing.validate()?;
    let scheme = url.split(':').next().unwrap_or_default().to_lowercase();
    debug!(backend = %name, %scheme, "building sqlx pool");

    match scheme.as_str() {
        "mysql" => {
            let pool = MySqlPoolOptions::new()
                .max_connections(sizing.max_connections_or_default())
                .min_connections(sizing.min_connections_or_default())
                .acquire_timeout(sizing.acquire_timeout())
                .idle_timeout(policy.idle_timeout)
                .max_lifetime(policy.max_lifetime)
                .test_before_acquire(policy.test_before_acquire)
                .connect(&url)
                .await?;
            Ok(SqlxPool::MySql(pool))
        }
        "postgres" | "postgresql" => {
            let pool = PgPoolOptions::new()
                .max_connections(sizing.max_connections_or_default())
                .min_connections(sizing.min_connections_or_default())
                .acquire_timeout(sizing.acquire_timeout())
                .idle_timeout(policy.idle_timeout)
                .max_lifetime(policy.max_lifetime)
                .test_before_acquire(policy.test_before_acquire)
                .connect(&url)
                .await?;
            Ok(SqlxPool::Postgres(pool))
        }
        "sqlite" => {
            let pool = SqlitePoolOptions::new()
                .max_connections(sizing.max_connections_or_default())
                .min_connections(sizing.min_connections_or_default())
                .acquire_timeout(sizing.acquire_timeout())
                .idle_timeout(policy.idle_timeout)
                .max_lifetime(policy.max_lifetime)
                .test_before_acquire(policy.test_before_acquire)
                .connect(&url)
                .await?;
            Ok(SqlxPool::SQLite(pool))
        }
        other => Err(format!("unsupported backend URL scheme `{other}`").into()),
    }
}

/// Default factory: one plain sqlx pool per backend.
///
/// Connects eagerly, so an unreachable backend fails broker construction
/// instead of the first query.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPoolFactory;

#[async_trait]
impl PoolFactory for RawPoolFactory {
    async fn build(
        &self,
        name: &str,
        params: &BackendParameters,
    ) -> Result<Arc<dyn ConnectionPool>, PoolError> {
        let pool = connect_pool(
            name,
            params,
            LifetimePolicy {
                idle_timeout: Some(params.pool.idle_timeout()),
                max_lifetime: params.pool.max_lifetime(),
                test_before_acquire: params.pool.test_before_acquire_or_default(),
            },
        )
        .await?;
        Ok(Arc::new(pool))
    }
}

/// Factory for the distributed (XA) transaction mode.
///
/// The driver stack has no XA-aware pool, so this shapes the plain pool for
/// two-phase participants instead: connections are never recycled by idleness
/// or lifetime while a transaction branch may still reference them, and every
/// connection is verified before it is handed out. Transaction coordination
/// itself lives in the layer above the broker.
#[derive(Debug, Clone, Copy, Default)]
pub struct XaPoolFactory;

#[async_trait]
impl PoolFactory for XaPoolFactory {
    async fn build(
        &self,
        name: &str,
        params: &BackendParameters,
    ) -> Result<Arc<dyn ConnectionPool>, PoolError> {
        let pool = connect_pool(
            name,
            params,
            LifetimePolicy {
                idle_timeout: None,
                max_lifetime: None,
                test_before_acquire: true,
            },
        )
        .await?;
        Ok(Arc::new(pool))
    }
}
