//! Bearer token authentication

use auth::Role;
use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Authenticated caller, attached to the request by [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Authentication middleware
///
/// Validates the bearer token against the live user record and inserts an
/// [`AuthUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        debug!("Request without bearer token to {}", req.uri().path());
        ApiError::Unauthorized("missing bearer token".to_string())
    })?;

    let (id, role) = state.auth.validate_token_with_role(bearer.token()).await?;

    req.extensions_mut().insert(AuthUser { id, role });

    Ok(next.run(req).await)
}

/// Admin gate, layered inside [`auth_middleware`]
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !user.is_admin() {
        debug!("User {} denied admin route {}", user.id, req.uri().path());
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
