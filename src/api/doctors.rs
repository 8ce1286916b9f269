use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::clients::places::{DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_METERS, LatLng, Place};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PlaceSearchRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub radius: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    doctors: Vec<Place>,
}

/// Accepts either explicit coordinates or a free-form address.
async fn resolve_location(
    state: &AppState,
    request: &PlaceSearchRequest,
) -> Result<LatLng, ApiError> {
    if let (Some(lat), Some(lng)) = (request.latitude, request.longitude) {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ApiError::validation("Invalid coordinate format"));
        }
        return Ok(LatLng { lat, lng });
    }

    if let Some(address) = request.address.as_deref().filter(|a| !a.is_empty()) {
        return Ok(state.places.geocode(address).await?);
    }

    Err(ApiError::validation(
        "Either latitude/longitude or address is required",
    ))
}

async fn search(
    state: &AppState,
    request: PlaceSearchRequest,
    keyword: &str,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let location = resolve_location(state, &request).await?;
    let radius = request.radius.unwrap_or(DEFAULT_RADIUS_METERS);
    let limit = request.limit.unwrap_or(DEFAULT_MAX_RESULTS);

    let doctors = state.places.nearby(location, keyword, radius, limit).await?;

    Ok(Json(DoctorsResponse { doctors }))
}

/// POST /doctors/find-doctors
pub async fn find_doctors(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceSearchRequest>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    search(&state, request, "doctor medical clinic hospital").await
}

/// POST /doctors/find-dermatologists
/// Dermatologists get their own route; that is what the app is mostly for.
pub async fn find_dermatologists(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceSearchRequest>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    search(&state, request, "dermatologist medical clinic").await
}
