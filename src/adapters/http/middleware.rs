use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    application::jwt,
    domain::entities::user::UserRole,
};

/// Identity of the authenticated caller, inserted as a request extension by
/// `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::InvalidCredentials)?;
    let claims = jwt::verify(token, &app_state.config.jwt_secret)?;
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidCredentials)?;

    request.extensions_mut().insert(AuthUser {
        id,
        role: UserRole::from_str(&claims.role),
    });
    Ok(next.run(request).await)
}

/// Runs inside `auth_middleware`; rejects non-admin callers.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == UserRole::Admin => Ok(next.run(request).await),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::InvalidCredentials),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
