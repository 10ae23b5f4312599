use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{Role, User};
use crate::database::Store;
use crate::error::{ApiError, ApiResult};

/// Same message for unknown email and wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body returned by both signup and login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: String,
    pub role: Role,
    pub token: String,
}

/// Credential store and token issuer
pub struct AuthService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn signup(&self, request: SignupRequest) -> ApiResult<AuthResponse> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::validation_error("Email and password are required", None));
        }
        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(r) => r
                .parse::<Role>()
                .map_err(|_| ApiError::validation_error("Role must be 'user' or 'owner'", None))?,
        };

        if self.store.find_user(&request.email).await?.is_some() {
            return Err(ApiError::bad_request("Email already registered"));
        }

        let user = User {
            email: request.email,
            password_hash: hash_password(&request.password)?,
            role,
            created_at: Utc::now(),
        };
        // Sign first so a signing failure leaves no account behind
        let response = self.issue(user.email.clone(), user.role)?;
        // A concurrent signup for the same email surfaces here as DuplicateEmail
        self.store.insert_user(&user).await?;

        tracing::info!("Registered {} as {}", user.email, user.role);
        Ok(response)
    }

    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let Some(user) = self.store.find_user(&request.email).await? else {
            tracing::warn!("Login failed: unknown email");
            return Err(ApiError::bad_request(INVALID_CREDENTIALS));
        };

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::warn!("Login failed: bad password for {}", user.email);
            return Err(ApiError::bad_request(INVALID_CREDENTIALS));
        }

        self.issue(user.email, user.role)
    }

    fn issue(&self, email: String, role: Role) -> ApiResult<AuthResponse> {
        let claims = Claims::new(email.clone(), role, self.security.jwt_expiry_secs);
        let token = generate_jwt(&claims, &self.security.jwt_secret)?;
        Ok(AuthResponse {
            user: email,
            role,
            token,
        })
    }
}
