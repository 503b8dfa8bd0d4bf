//! Consolidated test modules.
//!
//! End-to-end tests drive the full router, with all pipeline layers
//! attached, through `tower::ServiceExt::oneshot`.
