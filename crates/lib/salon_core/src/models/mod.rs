//! Domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! shapes in `salon_api::models`.

pub mod admin_user;
pub mod audit;
pub mod auth;
pub mod service;
