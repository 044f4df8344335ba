use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::error::Result;

pub type DbPool = Pool<Postgres>;

/// Opens the warehouse connection shared by every report.
///
/// The pool holds a single connection: reports run one after another and
/// reuse it.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;

    info!("warehouse connection established");
    Ok(pool)
}
