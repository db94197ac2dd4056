//! Error types for the migration tool.
//!
//! `AppError` is the top-level error type returned by every fallible operation. It
//! wraps the configuration and internal error sub-enums along with transport errors
//! from Serenity and reqwest. Whether an error aborts the run or only a single branch
//! or message is decided by the caller, not by the variant.

pub mod config;
pub mod internal;

use thiserror::Error;

use crate::error::{config::ConfigError, internal::InternalError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur during a migration or cleanup
/// run. Most variants use `#[from]` for automatic error conversion with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup, argument validation or guild resolution.
    ///
    /// Always fatal: the invocation stops before any remote work begins.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Unexpected data or conversion failure, usually scoped to a single message.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// HTTP transport error from reqwest while downloading an attachment.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Failure to serialize the run report.
    #[error(transparent)]
    SerdeJsonErr(#[from] serde_json::Error),

    /// Attachment download answered with a non-success status.
    ///
    /// # Fields
    /// - `status` - HTTP status code returned by the CDN
    /// - `body` - Readable response body, empty when none was sent
    #[error("Attachment HTTP error {status}: {body}")]
    AttachmentHttp { status: u16, body: String },

    /// Resource not found error.
    ///
    /// # Fields
    /// - Message describing what resource was not found
    #[error("{0}")]
    NotFound(String),

    /// The run was interrupted by a shutdown signal.
    ///
    /// Work finished before the interruption is kept; running the same command again
    /// resumes where it stopped.
    #[error("Interrupted; re-run the same command to resume")]
    Cancelled,
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// HTTP status of a failed Discord API response, if this is one.
    pub fn discord_status(&self) -> Option<u16> {
        match self {
            AppError::DiscordErr(err) => match err.as_ref() {
                serenity::Error::Http(http_err) => {
                    http_err.status_code().map(|status| status.as_u16())
                }
                _ => None,
            },
            _ => None,
        }
    }
}
