//! Role-based access guard middleware.
//!
//! Runs strictly after authentication: by the time a request gets here it
//! carries a verified [`crate::auth::Principal`]. The guard itself is a
//! pure lookup in the policy store; denial is a 403 distinct from the 401
//! issued earlier for unauthenticated requests.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::principal_from_request;
use crate::{AppState, error::ApiError, policy::access};

pub async fn access_guard_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = principal_from_request(&req)?;
    access::check(&state.policy, principal, req.uri().path())?;
    Ok(next.run(req).await)
}
