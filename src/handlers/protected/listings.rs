// handlers/protected/listings.rs - /api/listings[/:id]

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Map, Value};

use crate::api::RawFields;
use crate::database::models::Listing;
use crate::error::{ApiError, ApiResult};
use crate::handlers::public::auth::json_rejection;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::upload::UploadedFile;

/// Multipart field name carrying image files
pub const IMAGES_FIELD: &str = "images";

/// POST /api/listings - Create a listing from a multipart form
///
/// Text parts: title, location, locationString, rent, facilities, type,
/// description, availableFrom, events, amenities, leaseTerm, ownerContact.
/// `location`, `facilities`, `amenities` and `ownerContact` are JSON-encoded.
/// File parts: up to 5 under `images`.
pub async fn listing_create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<Listing>)> {
    let mut multipart = multipart
        .map_err(|e| ApiError::bad_request(format!("Expected a multipart form: {}", e.body_text())))?;

    let mut fields = RawFields::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        if name == IMAGES_FIELD {
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            // Browsers send an empty part when no file was picked
            if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                continue;
            }
            files.push(UploadedFile { file_name, bytes });
        } else if file_name.is_some() {
            return Err(ApiError::bad_request(format!("Unexpected file field '{}'", name)));
        } else {
            let text = field.text().await.map_err(bad_multipart)?;
            fields.insert_text(name, text);
        }
    }

    let listing = state.listing_service().create(&caller, &fields, files).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /api/listings - The caller's own listings, unpaginated
pub async fn listing_list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Listing>>> {
    Ok(Json(state.listing_service().list_own(&caller).await?))
}

/// GET /api/listings/:id - Owner-only read
pub async fn listing_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing>> {
    Ok(Json(state.listing_service().get(&caller, &id).await?))
}

/// PUT /api/listings/:id - Partial update from a JSON body
///
/// Nested fields may be sent either as JSON-encoded strings or as plain JSON
/// values. Fields that are not sent keep their stored value.
pub async fn listing_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<Listing>> {
    let Json(body) = payload.map_err(json_rejection)?;
    let fields = RawFields::from_map(body);
    Ok(Json(state.listing_service().update(&caller, &id, &fields).await?))
}

/// DELETE /api/listings/:id - Permanent removal
pub async fn listing_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.listing_service().delete(&caller, &id).await?;
    Ok(Json(json!({ "message": "Listing deleted successfully" })))
}

fn bad_multipart(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large(format!("Request body too large: {}", err.body_text()));
    }
    ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
}
