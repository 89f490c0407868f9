//! API endpoint handlers.
//!
//! Each module corresponds to a page of the clinic front end. Handlers
//! open a connection per request and reuse the domain modules.

pub mod auth;
pub mod dashboard;
pub mod doctor;
pub mod health;
pub mod patients;
pub mod reports;
pub mod summary;
pub mod visits;
