//! Request extractors that report failures as [`AppError`].

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` whose rejection renders as the standard `{error, message}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
