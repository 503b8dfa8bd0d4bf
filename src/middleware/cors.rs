//! Cross-origin policy enforcement middleware.
//!
//! Runs before authentication for every request. Preflights are answered
//! here and never reach the rest of the pipeline, so an unauthenticated
//! cross-origin probe cannot observe anything about the role rules behind
//! an endpoint.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, policy::CorsDecision, policy::cors};

pub async fn cors_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let decision = cors::evaluate(&state.policy, req.method(), req.uri().path(), req.headers());

    match decision {
        CorsDecision::PassThrough => next.run(req).await,
        CorsDecision::Preflight(headers) => {
            let mut response = StatusCode::NO_CONTENT.into_response();
            response.headers_mut().extend(headers);
            response
        }
        // Same shape as an accepted preflight minus the access-control
        // headers: no error body, nothing for an origin probe to learn.
        CorsDecision::PreflightRejected => StatusCode::NO_CONTENT.into_response(),
        CorsDecision::Actual(headers) => {
            let mut response = next.run(req).await;
            response.headers_mut().extend(headers);
            response
        }
        CorsDecision::Rejected => next.run(req).await,
    }
}
