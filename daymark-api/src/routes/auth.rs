/// Authentication and profile endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a local account
/// - `POST /v1/auth/login` - Login with email and password
/// - `POST /v1/auth/oauth` - Sign in with a provider-verified profile
/// - `GET /v1/auth/me` - Current user's profile
/// - `PUT /v1/auth/profile` - Update display name / avatar

use crate::{
    app::{AppState, AuthContext},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use daymark_core::auth::{jwt, password};
use daymark_core::models::user::{CreateUser, UpdateProfile, User, UserProfile};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub full_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Provider sign-in request
///
/// The provider handshake happens upstream; this endpoint receives the
/// already-verified profile.
#[derive(Debug, Deserialize, Validate)]
pub struct OAuthRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub full_name: String,

    pub avatar_url: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Provider is required"))]
    pub provider: String,

    #[validate(length(min = 1, max = 255, message = "Provider id is required"))]
    pub provider_id: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub full_name: Option<String>,

    pub avatar_url: Option<String>,
}

/// Authentication response: sanitized user plus a bearer token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Register a new local account
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash: Some(password_hash),
            full_name: req.full_name,
            avatar_url: None,
            provider: "local".to_string(),
            provider_id: None,
        },
    )
    .await?;

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Login with email and password
///
/// Accounts created solely through a provider have no password hash and
/// cannot log in locally; the response is the same generic 401 as a wrong
/// password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone().ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &hash)? {
        return Err(invalid());
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Sign in with a provider-verified profile
///
/// Creates the account on first sign-in. An existing local account with the
/// same email is linked to the provider; accounts already tied to a provider
/// are left untouched.
pub async fn oauth_sign_in(
    State(state): State<AppState>,
    Json(req): Json<OAuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = match User::find_by_email(&state.db, &req.email).await? {
        None => {
            User::create(
                &state.db,
                CreateUser {
                    email: req.email,
                    password_hash: None,
                    full_name: req.full_name,
                    avatar_url: req.avatar_url,
                    provider: req.provider,
                    provider_id: Some(req.provider_id),
                },
            )
            .await?
        }
        Some(existing) if existing.provider == "local" => User::link_provider(
            &state.db,
            existing.id,
            &req.provider,
            &req.provider_id,
            req.avatar_url.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?,
        Some(existing) => existing,
    };

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Returns the authenticated user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Updates the authenticated user's display name and avatar
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            full_name: req.full_name,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
