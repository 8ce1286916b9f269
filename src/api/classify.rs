use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use super::auth::session_id_from_headers;
use crate::db::{ClassificationRecord, IdTarget};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SaveResponse {
    success: bool,
}

#[derive(Serialize)]
pub struct ClassificationIdsResponse {
    success: bool,
    classification_ids: Vec<String>,
}

/// Resolve the session cookie to a user id, rejecting anonymous requests.
async fn current_user_id(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let session_id = session_id_from_headers(headers).ok_or(ApiError::NotLoggedIn)?;

    state
        .auth
        .resolve_identity(&session_id)
        .await?
        // A session with no user means it was revoked elsewhere
        .ok_or_else(|| ApiError::AuthFailed("Session has expired".to_string()))
}

/// POST /classify/save-classification
/// Store an uploaded image together with the label the user assigned to it.
/// Multipart body: a `classification` text field and an `image` file field.
pub async fn save_classification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<SaveResponse>, ApiError> {
    let user_id = current_user_id(&state, &headers).await?;

    let mut classification: Option<String> = None;
    let mut image: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("classification") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid classification: {e}")))?;
                classification = Some(text);
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid image data: {e}")))?
                    .to_vec();
                image = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let (Some(classification), Some((filename, content_type, data))) =
        (classification.filter(|c| !c.is_empty()), image)
    else {
        return Err(ApiError::validation(
            "Classification and image are required",
        ));
    };

    let classification_id = state.store.generate_id(IdTarget::ClassificationId).await?;
    state
        .store
        .save_classification(ClassificationRecord {
            classification_id,
            user_id,
            classification,
            filename,
            data,
            content_type,
        })
        .await?;

    Ok(Json(SaveResponse { success: true }))
}

#[derive(Deserialize)]
pub struct GetClassificationQuery {
    pub classification_id: String,
}

/// GET /classify/get-classification
/// Serve the stored image back with its original content type and filename,
/// scoped to the session's user.
pub async fn get_classification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<GetClassificationQuery>,
) -> Result<Response, ApiError> {
    let user_id = current_user_id(&state, &headers).await?;

    let Some(record) = state
        .store
        .get_classification(&query.classification_id, &user_id)
        .await?
    else {
        return Err(ApiError::validation("Classification not found"));
    };

    let disposition = format!("inline; filename=\"{}\"", record.filename);
    Ok((
        [
            (header::CONTENT_TYPE, record.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        record.data,
    )
        .into_response())
}

/// GET /classify/get-classification-ids
pub async fn get_classification_ids(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ClassificationIdsResponse>, ApiError> {
    let user_id = current_user_id(&state, &headers).await?;

    let classification_ids = state.store.list_classification_ids(&user_id).await?;

    Ok(Json(ClassificationIdsResponse {
        success: true,
        classification_ids,
    }))
}
