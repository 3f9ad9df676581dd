use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::services::auth;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// The authenticated session, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: i32,
    pub user_id: i32,
    pub user_name: String,
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Requires a live session, taken from `Authorization: Bearer <token>` or
/// the `sessionid` cookie.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .map(str::to_string)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .ok_or(AppError::Unauthorized("Authentication required".to_string()))?;

    let (session, user) = auth::resolve_session(&state.db, &token)
        .await?
        .ok_or(AppError::Unauthorized("Invalid or expired session".to_string()))?;

    req.extensions_mut().insert(SessionContext {
        session_id: session.id,
        user_id: user.id,
        user_name: user.user_name,
    });

    Ok(next.run(req).await)
}
