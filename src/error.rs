use thiserror::Error;

use crate::auth::FieldErrors;

/// Errors raised while parsing user input at the edges of the app.
///
/// Lookups that find nothing return `None` instead; these are only for input
/// that can never be valid.
#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("Invalid id '{0}': expected a number")]
    InvalidId(String),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
}
