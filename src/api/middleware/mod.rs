//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Audit logger: records every request, including ones auth rejects
//! 2. Auth validator: token → identity (protected routes only)

pub mod audit;
pub mod auth;
