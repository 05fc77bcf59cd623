//! Identity-provider boundary shared by skateleague services.
//!
//! Provides ID-token validation, identity cookie builders, and the
//! `CurrentIdentity` / `Identity` extractors.

pub mod cookie;
pub mod identity;
pub mod token;
