//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator — bearer token to `Principal`
//! 2. Access logger — logs after auth, has the principal

pub mod audit;
pub mod auth;
