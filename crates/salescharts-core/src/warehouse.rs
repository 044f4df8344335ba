use sqlx::{postgres::PgRow, FromRow};
use tracing::debug;

use crate::db::DbPool;
use crate::error::Result;

/// Runs a fixed, parameterless query and materialises every row.
///
/// Reports decide what an empty result means; this layer only surfaces
/// connectivity and SQL errors.
pub async fn fetch_rows<T>(pool: &DbPool, sql: &str) -> Result<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let rows = sqlx::query_as::<_, T>(sql).fetch_all(pool).await?;
    debug!(rows = rows.len(), "warehouse query returned");
    Ok(rows)
}
