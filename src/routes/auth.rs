use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::entities::user::{self, Entity as User};
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::session::{SessionContext, SESSION_COOKIE};
use crate::services::auth;
use crate::state::AppState;

const CSRF_COOKIE: &str = "csrftoken";

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    success: bool,
    username: String,
    /// Bearer token for clients that do not keep cookies.
    token: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CheckUserRequest {
    user_name: Option<String>,
    email: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSummary {
    user_name: String,
    email: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckUserResponse {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserSummary>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    username: Option<String>,
    old_password: Option<String>,
    new_password: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn cookie(name: &'static str, value: String, http_only: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .build()
}

#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 400, description = "Missing or malformed body"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AppError::BadRequest("Invalid request".to_string()));
    };

    let user = auth::authenticate(&state.db, &username, &password)
        .await?
        .ok_or(AppError::Unauthorized("Invalid credentials".to_string()))?;

    let token = auth::create_session(&state.db, &user, state.config.session_ttl_hours).await?;
    tracing::info!(user_id = user.id, user_name = %user.user_name, "Login succeeded");

    let jar = jar.add(cookie(SESSION_COOKIE, token.clone(), true));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            username: user.user_name,
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 200, description = "Session revoked", body = StatusResponse),
        (status = 401, description = "No active session")
    ),
    security(
        ("session_token" = [])
    ),
    tag = "Authentication"
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    auth::revoke_session(&state.db, session.session_id).await?;
    tracing::info!(user_id = session.user_id, user_name = %session.user_name, "Logged out");

    let mut expired = Cookie::from(SESSION_COOKIE);
    expired.set_path("/");
    Ok((jar.remove(expired), Json(StatusResponse::success())))
}

#[utoipa::path(
    get,
    path = "/get-csrf-token/",
    responses(
        (status = 200, description = "Fresh anti-forgery token, also set as the csrftoken cookie", body = CsrfTokenResponse)
    ),
    tag = "Authentication"
)]
pub async fn get_csrf_token(jar: CookieJar) -> impl IntoResponse {
    let csrf_token = auth::generate_token();
    let jar = jar.add(cookie(CSRF_COOKIE, csrf_token.clone(), false));
    (jar, Json(CsrfTokenResponse { csrf_token }))
}

#[utoipa::path(
    post,
    path = "/check-user/",
    request_body = CheckUserRequest,
    responses(
        (status = 200, description = "Whether a user matches both name and email", body = CheckUserResponse),
        (status = 400, description = "Username and email are required")
    ),
    tag = "Authentication"
)]
pub async fn check_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CheckUserRequest>,
) -> Result<Json<CheckUserResponse>, AppError> {
    let (Some(user_name), Some(email)) = (non_empty(payload.user_name), non_empty(payload.email))
    else {
        return Err(AppError::BadRequest(
            "Username and email are required".to_string(),
        ));
    };

    let user = User::find()
        .filter(user::Column::UserName.eq(&user_name))
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    Ok(Json(CheckUserResponse {
        exists: user.is_some(),
        user: user.map(|u| UserSummary {
            user_name: u.user_name,
            email: u.email,
        }),
    }))
}

#[utoipa::path(
    post,
    path = "/change-password/",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = StatusResponse),
        (status = 400, description = "Missing or malformed body"),
        (status = 401, description = "Invalid old password")
    ),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let (Some(username), Some(old_password), Some(new_password)) = (
        payload.username,
        payload.old_password,
        non_empty(payload.new_password),
    ) else {
        return Err(AppError::BadRequest("Invalid request".to_string()));
    };

    let user = auth::authenticate(&state.db, &username, &old_password)
        .await?
        .ok_or(AppError::Unauthorized("Invalid old password".to_string()))?;

    let user = auth::set_password(&state.db, user, &new_password).await?;
    tracing::info!(user_id = user.id, user_name = %user.user_name, "Password changed");

    Ok(Json(StatusResponse::success()))
}
