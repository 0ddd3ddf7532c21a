use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::{pool::PoolConnection, Sqlite, SqlitePool};

use crate::error::AppError;

/// A pooled connection scoped to one request. Dropping it hands the connection back
/// to the pool, whichever way the handler returns.
pub struct DbConnection(pub PoolConnection<Sqlite>);

impl DbConnection {
    pub async fn acquire(pool: &SqlitePool) -> Result<Self, AppError> {
        let conn = pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire a database connection: {}", e);
            AppError::Store(e)
        })?;
        Ok(Self(conn))
    }
}

impl<S> FromRequestParts<S> for DbConnection
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);
        Self::acquire(&pool).await
    }
}
