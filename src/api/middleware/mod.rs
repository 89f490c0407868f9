//! API middleware stack.
//!
//! Execution order on protected routes (outermost → innermost):
//! 1. Auth validator: session token lookup
//! 2. Rate limiter: keyed on the authenticated doctor
//! 3. Access logger: logs after auth, has doctor_id
//!
//! Open routes skip auth and are limited per peer address.

pub mod audit;
pub mod auth;
pub mod rate;
