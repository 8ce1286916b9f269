use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
mod classify;
mod doctors;
mod error;

pub use error::ApiError;

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/get-user-id", get(auth::get_user_id))
        .route("/auth/delete-user", delete(auth::delete_user))
        .route(
            "/classify/save-classification",
            post(classify::save_classification),
        )
        .route(
            "/classify/get-classification-ids",
            get(classify::get_classification_ids),
        )
        .route(
            "/classify/get-classification",
            get(classify::get_classification),
        )
        .route("/doctors/find-doctors", post(doctors::find_doctors))
        .route(
            "/doctors/find-dermatologists",
            post(doctors::find_dermatologists),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
