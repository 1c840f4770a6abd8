//! Request handlers.

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod users;
