//! Authentication middleware and handlers.
//!
//! Users register with an email and password; passwords are stored as Argon2
//! hashes. A successful register or login issues an opaque bearer token (a
//! random UUID) recorded in the `sessions` table. Tokens expire after
//! `session_ttl_days` and are revoked on logout.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::queries::{sessions, users};
use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::models::{
    CurrentUser, LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UserSummary,
};
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject requests without a live session and attach the [`CurrentUser`]
/// to the ones that have one.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let Some(token) = token else {
        return AppError::Unauthorized("Authentication required".into()).into_response();
    };

    let user = match state.db.get() {
        Ok(conn) => sessions::find_session_user(&conn, &token, state.config.session_ttl_days),
        Err(e) => return AppError::from(e).into_response(),
    };

    match user {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                name: user.name,
                email: user.email,
                token,
            });
            next.run(request).await
        }
        Ok(None) => {
            debug!("Rejected unknown or expired session token");
            AppError::Unauthorized("Invalid or expired token".into()).into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "name, email and password are required".into(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is not valid".into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let conn = state.db.get()?;
    if users::find_by_email(&conn, email)?.is_some() {
        return Err(AppError::Validation("User already exists".into()));
    }

    let password_hash = hash_password(&form.password)?;
    let user_id = insert_user(&conn, name, email, &password_hash)?;
    let token = issue_token(&conn, user_id)?;

    info!(user_id, "Registered user");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Insert a user, reporting a lost race on the unique email index the same
/// way as the up-front duplicate check.
fn insert_user(
    conn: &rusqlite::Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<i64> {
    match users::create_user(conn, name, email, password_hash) {
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Validation("User already exists".into()))
        }
        result => Ok(result?),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let conn = state.db.get()?;

    let user = users::find_by_email(&conn, form.email.trim())?;
    let Some(user) = user.filter(|u| verify_password(&form.password, &u.password_hash)) else {
        warn!("Failed login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    let token = issue_token(&conn, user.id)?;
    info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { token }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    sessions::delete_session(&conn, &user.token)?;
    info!(user_id = user.id, "User logged out");
    Ok(Json(MessageResponse {
        message: "Logged out".into(),
    }))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    let conn = state.db.get()?;
    Ok(Json(users::list_users(&conn)?))
}

fn issue_token(conn: &rusqlite::Connection, user_id: i64) -> AppResult<String> {
    let token = Uuid::new_v4().to_string();
    sessions::create_session(conn, &token, user_id)?;
    Ok(token)
}

/// Hash a password with Argon2id and a random salt, in PHC string format.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

/// Verify a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Stored password hash is not in PHC format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
