//! API endpoint handlers.
//!
//! One module per resource. Handlers open a connection per request,
//! authorize against the path subject, and delegate to the directory
//! and scheduling modules.

pub mod appointments;
pub mod auth;
pub mod employees;
pub mod examinations;
pub mod home;
pub mod patients;
pub mod schedules;
