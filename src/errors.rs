use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Category identifier is not in the registry
    #[error("Unknown category '{category}'")]
    UnknownCategory { category: String },

    /// Category directory missing for a listing (distinct from an empty category)
    #[error("Category '{category}' not found")]
    CategoryNotFound { category: String },

    /// Delete or replace target does not exist
    #[error("Image '{filename}' not found in category '{category}'")]
    AssetNotFound { category: String, filename: String },

    /// Uploaded bytes could not be decoded or re-encoded as an image
    #[error("Failed to process image: {reason}")]
    ImageDecode { reason: String },

    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Disk or filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnknownCategory { .. } => StatusCode::NOT_FOUND,
            Error::CategoryNotFound { .. } => StatusCode::NOT_FOUND,
            Error::AssetNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ImageDecode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::UnknownCategory { category } => format!("Unknown category '{category}'"),
            Error::CategoryNotFound { category } => format!("Category '{category}' not found"),
            Error::AssetNotFound { category, filename } => {
                format!("Image '{filename}' not found in category '{category}'")
            }
            Error::ImageDecode { reason } => format!("Failed to process image: {reason}"),
            Error::BadRequest { message } => message.clone(),
            Error::Io(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Io(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::ImageDecode { .. } => {
                tracing::warn!("Rejected upload: {}", self);
            }
            Error::UnknownCategory { .. }
            | Error::CategoryNotFound { .. }
            | Error::AssetNotFound { .. }
            | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
