//! User-tier endpoints, reachable by the USER and ADMIN roles.

use axum::{Extension, Json, response::IntoResponse};
use serde_json::json;

use crate::auth::Principal;

pub async fn profile(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(json!({
        "message": "User profile endpoint",
        "username": principal.username(),
        "access": "USER or ADMIN",
    }))
}

pub async fn info(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(json!({
        "message": "User information",
        "username": principal.username(),
    }))
}
