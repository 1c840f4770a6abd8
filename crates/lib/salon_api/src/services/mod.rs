//! Business logic invoked by the request handlers.

pub mod audit;
pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod rate_limit;
pub mod uploads;
pub mod users;
