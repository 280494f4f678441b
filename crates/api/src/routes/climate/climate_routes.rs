use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;

use crate::{
    db::{self, one_year_before, PrecipitationReading, Station, TemperatureReading, TemperatureStats},
    AppState,
};

/// Station with the most observation rows in the dataset; the tobs feed is
/// pinned to it rather than derived per request.
pub const MOST_ACTIVE_STATION: &str = "USC00519281";

fn storage_error(err: db::Error) -> (StatusCode, String) {
    error!("storage error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to query storage: {}", err),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation readings from the final year of data, one object per source row", body = Vec<PrecipitationReading>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage unavailable or observation table empty")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationReading>>, (StatusCode, String)> {
    let latest = state
        .climate_db
        .most_recent_date()
        .await
        .map_err(storage_error)?;

    let readings = state
        .climate_db
        .precipitation(one_year_before(latest), latest)
        .await
        .map_err(storage_error)?;

    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station row", body = Vec<Station>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage unavailable")
    ))]
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Station>>, (StatusCode, String)> {
    let stations = state.climate_db.stations().await.map_err(storage_error)?;

    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations for the most active station over the final year of data", body = Vec<TemperatureReading>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage unavailable or observation table empty")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureReading>>, (StatusCode, String)> {
    let latest = state
        .climate_db
        .most_recent_date()
        .await
        .map_err(storage_error)?;

    let readings = state
        .climate_db
        .temperature_observations(MOST_ACTIVE_STATION.to_string(), one_year_before(latest))
        .await
        .map_err(storage_error)?;

    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "Start date (yyyy-mm-dd), inclusive; not validated"),
    ),
    responses(
        (status = OK, description = "Single-element array with min/avg/max temperature from the start date onward", body = Vec<TemperatureStats>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage unavailable")
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<Vec<TemperatureStats>>, (StatusCode, String)> {
    // The segment goes to the store untouched; a malformed date just compares
    // lexicographically against stored dates.
    let stats = state
        .climate_db
        .temperature_stats(start, None)
        .await
        .map_err(storage_error)?;

    Ok(Json(vec![stats]))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "Start date (yyyy-mm-dd), inclusive; not validated"),
        ("end" = String, Path, description = "End date (yyyy-mm-dd), inclusive; not validated"),
    ),
    responses(
        (status = OK, description = "Single-element array with min/avg/max temperature over the inclusive window", body = Vec<TemperatureStats>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage unavailable")
    ))]
pub async fn temperature_stats_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Vec<TemperatureStats>>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(start, Some(end))
        .await
        .map_err(storage_error)?;

    Ok(Json(vec![stats]))
}
