//! Test utilities for skateleague services.
//!
//! Provides `MockIdentity` for minting signed-in requests and response body helpers.
//! Import from tests only, never from production code.

pub mod auth;
pub mod response;
