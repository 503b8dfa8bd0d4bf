//! Per-request pipeline middleware.
//!
//! The pipeline order is fixed and non-negotiable: CORS resolution always
//! precedes authentication, which always precedes the access guard, which
//! always precedes handler dispatch. Reversing it would leak role-check
//! side channels to unauthenticated cross-origin probes. The ordering is
//! wired in `build_app`.

mod access;
mod auth;
mod cors;

pub use access::access_guard_middleware;
pub use auth::auth_middleware;
pub use cors::cors_middleware;
