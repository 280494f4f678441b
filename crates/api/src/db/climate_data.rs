use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Duration};
use utoipa::ToSchema;

use super::Database;

/// Storage format for observation dates; lexicographic order on these strings
/// matches chronological order.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("observation table has no rows to derive the most recent date from")]
    EmptyDataset,
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("failed to query storage: {0}")]
    Query(#[from] sqlx::Error),
    #[error("storage schema mismatch: {0}")]
    Schema(String),
    #[error("failed to parse date string: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
}

/// A flat 365-day offset, not a calendar-aware year; crossing a leap day
/// shifts the result by one.
pub fn one_year_before(date: Date) -> Date {
    date - Duration::days(365)
}

/// One precipitation reading, one row per source observation.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct Station {
    pub id: i64,
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One temperature observation for a single station.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: f64,
}

/// Aggregate over a date-filtered subset of temperature observations.
/// All members are null when no rows match the window.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Maximum date across all observation rows.
    async fn most_recent_date(&self) -> Result<Date, Error>;

    /// Observations with `start <= date <= end`, duplicate dates retained.
    async fn precipitation(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<PrecipitationReading>, Error>;

    /// Every station row, unfiltered.
    async fn stations(&self) -> Result<Vec<Station>, Error>;

    /// Readings for one station with `date >= start`, open-ended upper bound.
    async fn temperature_observations(
        &self,
        station_id: String,
        start: Date,
    ) -> Result<Vec<TemperatureReading>, Error>;

    /// (min, avg, max) of temperature over `date >= start` and, when given,
    /// `date <= end`. The bounds are bound into the query as-is.
    async fn temperature_stats(
        &self,
        start: String,
        end: Option<String>,
    ) -> Result<TemperatureStats, Error>;
}

/// Executes the fixed query shapes against the sqlite store. Each operation
/// runs on its own scoped connection.
pub struct ClimateAccess {
    db: Database,
}

impl ClimateAccess {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn most_recent_date(&self) -> Result<Date, Error> {
        let mut conn = self.db.acquire().await?;

        let max: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *conn)
            .await?;

        let raw = max.ok_or(Error::EmptyDataset)?;
        Ok(Date::parse(&raw, DATE_FORMAT)?)
    }

    async fn precipitation(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<PrecipitationReading>, Error> {
        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query("SELECT date, prcp FROM measurement WHERE date >= ? AND date <= ?")
            .bind(start.format(DATE_FORMAT)?)
            .bind(end.format(DATE_FORMAT)?)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows
            .iter()
            .map(|row| PrecipitationReading {
                date: row.get("date"),
                prcp: row.get("prcp"),
            })
            .collect())
    }

    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let mut conn = self.db.acquire().await?;

        let rows =
            sqlx::query("SELECT id, station, name, latitude, longitude, elevation FROM station")
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows
            .iter()
            .map(|row| Station {
                id: row.get("id"),
                station: row.get("station"),
                name: row.get("name"),
                latitude: row.get("latitude"),
                longitude: row.get("longitude"),
                elevation: row.get("elevation"),
            })
            .collect())
    }

    async fn temperature_observations(
        &self,
        station_id: String,
        start: Date,
    ) -> Result<Vec<TemperatureReading>, Error> {
        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query("SELECT date, tobs FROM measurement WHERE station = ? AND date >= ?")
            .bind(&station_id)
            .bind(start.format(DATE_FORMAT)?)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows
            .iter()
            .map(|row| TemperatureReading {
                date: row.get("date"),
                tobs: row.get("tobs"),
            })
            .collect())
    }

    async fn temperature_stats(
        &self,
        start: String,
        end: Option<String>,
    ) -> Result<TemperatureStats, Error> {
        let mut conn = self.db.acquire().await?;

        let row = match end {
            Some(end) => {
                sqlx::query(
                    "SELECT MIN(tobs) AS min, AVG(tobs) AS avg, MAX(tobs) AS max
                     FROM measurement WHERE date >= ? AND date <= ?",
                )
                .bind(&start)
                .bind(&end)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT MIN(tobs) AS min, AVG(tobs) AS avg, MAX(tobs) AS max
                     FROM measurement WHERE date >= ?",
                )
                .bind(&start)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(TemperatureStats {
            min: row.get("min"),
            avg: row.get("avg"),
            max: row.get("max"),
        })
    }
}
