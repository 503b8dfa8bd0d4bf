//! Admin-tier endpoints. The access guard requires the full ADMIN role
//! set for everything under the admin prefix; handlers can assume an
//! admin principal.

use axum::{Extension, Json, response::IntoResponse};
use serde_json::json;

use crate::auth::Principal;

pub async fn dashboard(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(json!({
        "message": "Admin dashboard endpoint",
        "username": principal.username(),
        "access": "ADMIN ONLY",
    }))
}

pub async fn users() -> impl IntoResponse {
    Json(json!({
        "message": "List of all users",
        "access": "ADMIN ONLY - Full access to manage users",
    }))
}
