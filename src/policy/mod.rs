//! Policy layer: the immutable [`PolicyStore`], CORS decision logic, and
//! the role-based access guard.

pub mod access;
pub mod cors;
mod store;

pub use access::{AccessRule, MatchMode};
pub use cors::{CorsDecision, CorsPolicy};
pub use store::PolicyStore;
