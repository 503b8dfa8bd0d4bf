//! Bearer-token authentication middleware.
//!
//! Extracts the bearer token, hands it to the configured
//! [`crate::auth::Authenticator`], and stores the resulting
//! [`Principal`] in the request extensions for the access guard and the
//! handlers downstream. Failures are translated to generic 401 responses.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::{AppState, auth::Principal, error::ApiError};

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let principal = state.authenticator.authenticate(token)?;

    tracing::debug!(username = %principal.username(), "request authenticated");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Every failure maps to 401 with a generic message; the response does not
/// distinguish a missing header from a malformed one beyond that.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("Authentication credentials required"))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Invalid authentication credentials"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Invalid authentication credentials"))?;

    if token.is_empty() {
        return Err(ApiError::unauthenticated(
            "Invalid authentication credentials",
        ));
    }
    Ok(token)
}

/// Fetch the principal placed in the extensions by [`auth_middleware`].
///
/// Fails closed: a route that somehow reaches authorization without having
/// passed authentication is treated as unauthenticated.
pub fn principal_from_request(req: &Request) -> Result<&Principal, ApiError> {
    req.extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthenticated("Authentication credentials required"))
}
