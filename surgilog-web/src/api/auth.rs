//! Session authentication: login/logout handlers and middleware
//!
//! Clients log in with username/password and receive a session token, then
//! send it as `Authorization: Bearer <token>`. The middleware resolves the
//! token to a [`CurrentUser`] request extension; expired sessions are
//! rejected (and deleted on sight by the session store).

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use surgilog_common::auth::verify_password;
use surgilog_common::models::{CurrentUser, Role};

use crate::db::{sessions, users};
use crate::{ApiError, ApiResult, AppState};

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub profile_guid: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/login
///
/// Failed attempts get the same response whether the username or the
/// password was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = users::get_user_by_username(&state.db, &payload.username).await?;

    let Some(user) = user else {
        warn!("Login failed for unknown username '{}'", payload.username);
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    if !verify_password(&payload.password, &user.password_salt, &user.password_hash) {
        warn!("Login failed for '{}'", payload.username);
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let session = sessions::create_session(&state.db, &user.guid).await?;
    info!("User '{}' logged in ({})", user.username, user.role.as_str());

    Ok(Json(LoginResponse {
        token: session.token,
        username: user.username,
        role: user.role,
        profile_guid: user.profile_guid,
        expires_at: session.expires_at,
    }))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(token) = bearer_token(&headers) {
        sessions::delete_session(&state.db, &token).await?;
    }
    info!("User '{}' logged out", user.username);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/me
pub async fn current_user(
    Extension(user): Extension<CurrentUser>,
) -> Json<CurrentUser> {
    Json(user)
}

/// Authentication middleware
///
/// Resolves the bearer token to a session, loads the account, and attaches a
/// [`CurrentUser`] extension for the handlers. Applied to protected routes
/// only; `/health`, `/api/login` and the static UI stay public.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let session = sessions::get_session(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    let user = users::get_user(&state.db, &session.user_guid)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".to_string()))?;

    request.extensions_mut().insert(CurrentUser {
        user_guid: user.guid,
        username: user.username,
        role: user.role,
        profile_guid: user.profile_guid,
    });

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Require the admin role
pub fn require_admin(user: &CurrentUser) -> ApiResult<()> {
    if user.role != Role::Admin {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(())
}

/// Require a specific role
pub fn require_role(user: &CurrentUser, role: Role) -> ApiResult<()> {
    if user.role != role {
        return Err(ApiError::Forbidden(format!(
            "{} role required",
            role.as_str()
        )));
    }
    Ok(())
}

/// Require admin or a specific role
pub fn require_admin_or(user: &CurrentUser, role: Role) -> ApiResult<()> {
    if user.role != Role::Admin && user.role != role {
        return Err(ApiError::Forbidden(format!(
            "admin or {} role required",
            role.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer abc-123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn non_bearer_scheme_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn role_guards() {
        let admin = CurrentUser {
            user_guid: "u1".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            profile_guid: None,
        };
        let resident = CurrentUser {
            user_guid: "u2".to_string(),
            username: "res".to_string(),
            role: Role::Resident,
            profile_guid: Some("r1".to_string()),
        };

        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&resident).is_err());
        assert!(require_role(&resident, Role::Resident).is_ok());
        assert!(require_role(&resident, Role::Teacher).is_err());
        assert!(require_admin_or(&admin, Role::Teacher).is_ok());
        assert!(require_admin_or(&resident, Role::Teacher).is_err());
    }
}
