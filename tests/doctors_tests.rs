use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dermatrack::clients::places::{LatLng, Place, PlaceSearch, PlacesError};
use dermatrack::config::Config;
use dermatrack::state::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

/// Stand-in for the Google Maps client. Echoes the search keyword back as
/// the place name so tests can see which route queried what.
struct MockPlaceSearch;

#[async_trait::async_trait]
impl PlaceSearch for MockPlaceSearch {
    async fn geocode(&self, address: &str) -> Result<LatLng, PlacesError> {
        if address == "nowhere" {
            return Err(PlacesError::Api(
                "Could not geocode address: ZERO_RESULTS".to_string(),
            ));
        }
        Ok(LatLng {
            lat: 37.7749,
            lng: -122.4194,
        })
    }

    async fn nearby(
        &self,
        location: LatLng,
        keyword: &str,
        _radius: u32,
        _max_results: usize,
    ) -> Result<Vec<Place>, PlacesError> {
        Ok(vec![Place {
            name: keyword.to_string(),
            address: "123 Test St".to_string(),
            phone: Some("555-0123".to_string()),
            rating: Some(4.5),
            total_ratings: 100,
            website: None,
            is_open: true,
            location,
        }])
    }
}

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = AppState::with_place_search(config, Arc::new(MockPlaceSearch))
        .await
        .expect("Failed to create app state");
    dermatrack::api::router(state)
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_location_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json("/doctors/find-doctors", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Either latitude/longitude or address is required"
    );
}

#[tokio::test]
async fn coordinates_out_of_range_are_rejected() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/doctors/find-doctors",
            &json!({"latitude": 999.0, "longitude": -122.4194}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid coordinate format");
}

#[tokio::test]
async fn search_with_coordinates_returns_places() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/doctors/find-doctors",
            &json!({"latitude": 37.7749, "longitude": -122.4194}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let doctors = body["doctors"].as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["address"], "123 Test St");
    assert_eq!(doctors[0]["location"]["lat"], 37.7749);
}

#[tokio::test]
async fn search_with_address_geocodes_first() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/doctors/find-doctors",
            &json!({"address": "123 Test St, San Francisco, CA"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // the mock geocoder pins every address to San Francisco
    assert_eq!(body["doctors"][0]["location"]["lng"], -122.4194);
}

#[tokio::test]
async fn dermatologist_route_uses_the_dermatologist_keyword() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/doctors/find-dermatologists",
            &json!({"latitude": 37.7749, "longitude": -122.4194}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let name = body["doctors"][0]["name"].as_str().unwrap();
    assert!(name.contains("dermatologist"));
}

#[tokio::test]
async fn upstream_failures_surface_as_bad_gateway() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/doctors/find-doctors",
            &json!({"address": "nowhere"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Google Maps service is unavailable");
}
