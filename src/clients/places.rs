//! Thin client for the Google Maps geocoding and place-search APIs.
//!
//! The rest of the crate only sees the [`PlaceSearch`] trait; the concrete
//! client is swapped out in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MapsConfig;

pub const DEFAULT_RADIUS_METERS: u32 = 5000;
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Maps API key is not configured")]
    MissingApiKey,

    #[error("Maps request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Maps API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: u32,
    pub website: Option<String>,
    pub is_open: bool,
    pub location: LatLng,
}

/// Narrow interface over the external geolocation/place-search collaborator.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Convert a free-form address to coordinates.
    async fn geocode(&self, address: &str) -> Result<LatLng, PlacesError>;

    /// Search for health-related places around a point.
    async fn nearby(
        &self,
        location: LatLng,
        keyword: &str,
        radius: u32,
        max_results: usize,
    ) -> Result<Vec<Place>, PlacesError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    place_id: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    formatted_phone_number: Option<String>,
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: u32,
    website: Option<String>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: bool,
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleMapsClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &MapsConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key(&self) -> Result<&str, PlacesError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(PlacesError::MissingApiKey)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = format!("{}/maps/api/place/details/json", self.base_url);
        let response: DetailsResponse = self
            .client
            .get(&url)
            .query(&[
                ("place_id", place_id),
                (
                    "fields",
                    "name,formatted_address,formatted_phone_number,opening_hours,rating,\
                     user_ratings_total,website",
                ),
                ("key", self.key()?),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "OK" {
            return Ok(None);
        }
        Ok(response.result)
    }
}

#[async_trait]
impl PlaceSearch for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<LatLng, PlacesError> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response: GeocodeResponse = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.key()?)])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(PlacesError::Api(format!(
                "Could not geocode address: {}",
                response.status
            )));
        }

        response
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| PlacesError::Api("Could not geocode address: no results".to_string()))
    }

    async fn nearby(
        &self,
        location: LatLng,
        keyword: &str,
        radius: u32,
        max_results: usize,
    ) -> Result<Vec<Place>, PlacesError> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);
        let response: NearbyResponse = self
            .client
            .get(&url)
            .query(&[
                ("location", format!("{},{}", location.lat, location.lng)),
                ("radius", radius.to_string()),
                ("keyword", keyword.to_string()),
                ("type", "health".to_string()),
                ("key", self.key()?.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            status => return Err(PlacesError::Api(format!("Place search failed: {status}"))),
        }

        let mut places = Vec::new();
        for nearby in response.results.into_iter().take(max_results) {
            let Some(details) = self.place_details(&nearby.place_id).await? else {
                continue;
            };

            places.push(Place {
                name: details.name,
                address: details.formatted_address,
                phone: details.formatted_phone_number,
                rating: details.rating,
                total_ratings: details.user_ratings_total,
                website: details.website,
                is_open: details.opening_hours.is_some_and(|h| h.open_now),
                location: nearby.geometry.location,
            });
        }

        Ok(places)
    }
}
