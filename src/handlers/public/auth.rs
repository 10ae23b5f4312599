// handlers/public/auth.rs - POST /api/auth/signup, POST /api/auth/login

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::services::{AuthResponse, LoginRequest, SignupRequest};
use crate::state::AppState;

/// POST /api/auth/signup - Register an account and receive a bearer token
///
/// Expected Input:
/// ```json
/// { "email": "owner1@example.com", "password": "pw123", "role": "owner" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "user": "owner1@example.com", "role": "owner", "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
pub async fn signup_post(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload.map_err(json_rejection)?;
    let response = state.auth_service().signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Exchange credentials for a fresh bearer token
///
/// Unknown email and wrong password produce the same 400 response.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload.map_err(json_rejection)?;
    let response = state.auth_service().login(request).await?;
    Ok(Json(response))
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}
