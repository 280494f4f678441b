use std::{str::FromStr, time::Duration};

use log::info;
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row, Sqlite,
};

use super::Error;

/// Declared layout of the two relations the queries depend on. The ingestion
/// process owns the schema; startup only verifies it matches.
const EXPECTED_TABLES: &[(&str, &[&str])] = &[
    ("measurement", &["station", "date", "prcp", "tobs"]),
    (
        "station",
        &["id", "station", "name", "latitude", "longitude", "elevation"],
    ),
];

/// Handle on the sqlite store holding the observation and station relations.
///
/// Constructed once at startup and injected into the dispatcher; cloning
/// shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the store identified by `url` (e.g. `sqlite://hawaii.sqlite`).
    /// The file must already exist; this service never creates it.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(Error::Unavailable)?
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(Error::Unavailable)?;

        info!("sqlite store opened: {}", url);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Scoped connection for a single operation; dropping it returns the
    /// connection to the pool on every exit path.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, Error> {
        self.pool.acquire().await.map_err(Error::Unavailable)
    }

    /// Check the store against the declared table layout, naming the first
    /// missing table or column.
    pub async fn verify_schema(&self) -> Result<(), Error> {
        let mut conn = self.acquire().await?;

        for (table, columns) in EXPECTED_TABLES {
            let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
                .fetch_all(&mut *conn)
                .await?;

            if rows.is_empty() {
                return Err(Error::Schema(format!("table '{}' not found in storage", table)));
            }

            let found: Vec<String> = rows.iter().map(|row| row.get("name")).collect();
            for column in *columns {
                if !found.iter().any(|c| c == column) {
                    return Err(Error::Schema(format!(
                        "table '{}' is missing expected column '{}' (found: {})",
                        table,
                        column,
                        found.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }

    /// Close the pool; called once on process shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("sqlite store closed");
    }
}
