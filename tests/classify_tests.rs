use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dermatrack::config::Config;
use dermatrack::state::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "dermatrack-test-boundary";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    let state = AppState::new(test_config())
        .await
        .expect("Failed to create app state");
    (dermatrack::api::router(state.clone()), state)
}

async fn signup(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"username": username, "password": "pw"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn multipart_body(classification: Option<&str>, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(label) = classification {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"classification\"\r\n\r\n{label}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn save_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/classify/save-classification")
        .header(
            header::CONTENT_TYPE,
            format!("{}; boundary={BOUNDARY}", mime::MULTIPART_FORM_DATA),
        );

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body)).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn saving_requires_a_session() {
    let (app, _state) = spawn_app().await;

    let body = multipart_body(Some("eczema"), Some(("rash.png", b"fake-png-bytes")));
    let response = app.oneshot(save_request(None, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Not logged in");
}

#[tokio::test]
async fn save_then_list_roundtrip() {
    let (app, state) = spawn_app().await;
    let cookie = signup(&app, "alice").await;

    let body = multipart_body(Some("eczema"), Some(("rash.png", b"fake-png-bytes")));
    let response = app
        .clone()
        .oneshot(save_request(Some(&cookie), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/classify/get-classification-ids")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let ids = body["classification_ids"].as_array().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].as_str().unwrap().len(), 16);

    // the id in the response matches what the store holds
    let user_id = state
        .store
        .get_user_id_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    let stored_ids = state.store.list_classification_ids(&user_id).await.unwrap();
    assert_eq!(stored_ids[0], ids[0].as_str().unwrap());
}

#[tokio::test]
async fn listing_only_returns_the_callers_records() {
    let (app, _state) = spawn_app().await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;

    let body = multipart_body(Some("psoriasis"), Some(("arm.png", b"bytes")));
    let response = app
        .clone()
        .oneshot(save_request(Some(&alice), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/classify/get-classification-ids")
                .header(header::COOKIE, &bob)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert!(body["classification_ids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_image_is_rejected() {
    let (app, _state) = spawn_app().await;
    let cookie = signup(&app, "carol").await;

    let body = multipart_body(Some("eczema"), None);
    let response = app.oneshot(save_request(Some(&cookie), body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Classification and image are required");
}

#[tokio::test]
async fn a_revoked_session_reads_as_expired() {
    let (app, _state) = spawn_app().await;
    let cookie = signup(&app, "dave").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/classify/get-classification-ids")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Session has expired");
}

#[tokio::test]
async fn fetching_a_saved_classification_returns_the_original_image() {
    let (app, _state) = spawn_app().await;
    let cookie = signup(&app, "alice").await;

    let body = multipart_body(Some("eczema"), Some(("rash.png", b"fake-png-bytes")));
    let response = app
        .clone()
        .oneshot(save_request(Some(&cookie), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/classify/get-classification-ids")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    let id = body["classification_ids"][0].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/classify/get-classification?classification_id={id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"rash.png\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake-png-bytes");
}

#[tokio::test]
async fn someone_elses_classification_reads_as_not_found() {
    let (app, state) = spawn_app().await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;

    let body = multipart_body(Some("psoriasis"), Some(("arm.png", b"bytes")));
    let response = app
        .clone()
        .oneshot(save_request(Some(&alice), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user_id = state
        .store
        .get_user_id_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    let id = state.store.list_classification_ids(&user_id).await.unwrap()[0].clone();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/classify/get-classification?classification_id={id}"))
                .header(header::COOKIE, &bob)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Classification not found");
}
