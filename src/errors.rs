/*!
 * Error types for the DeepL client.
 *
 * Every failure the client can surface is a variant of [`DeepLError`].
 * The status classifier works with the lighter [`ErrorKind`] tag and the
 * request executor turns a tag plus message into the full error.
 */

use thiserror::Error;

use crate::translation::document::DocumentHandle;

/// Result alias used throughout the library
pub type Result<T, E = DeepLError> = std::result::Result<T, E>;

/// Errors returned by the DeepL client
#[derive(Error, Debug)]
pub enum DeepLError {
    /// Transport-level failure (timeout, refused connection) after retries ran out
    #[error("Connection error: {0}")]
    Connection(String),

    /// The auth key was rejected (HTTP 403)
    #[error("Authorization failure, check auth key: {0}")]
    Authorization(String),

    /// The account quota for this billing period is used up (HTTP 456)
    #[error("Quota for this billing period has been exceeded: {0}")]
    QuotaExceeded(String),

    /// The requested resource does not exist (HTTP 404)
    #[error("Not found, check server URL: {0}")]
    NotFound(String),

    /// The glossary referenced by the request does not exist (HTTP 404 with a glossary)
    #[error("Glossary not found: {0}")]
    GlossaryNotFound(String),

    /// The server rejected the request parameters (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited (HTTP 429) on every attempt
    #[error("Too many requests, DeepL servers are currently experiencing high load: {0}")]
    TooManyRequests(String),

    /// The translated document is not ready for download yet (HTTP 503 while downloading)
    #[error("Document not ready: {0}")]
    DocumentNotReady(String),

    /// The service is temporarily unavailable (HTTP 503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other unexpected status code, including 5xx once retries ran out
    #[error("API responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message, enriched with the response body
        message: String,
    },

    /// A document translation failed after (or while) uploading
    ///
    /// `handle` is present whenever the upload succeeded, so the caller can
    /// resume polling or downloading without uploading the document again.
    #[error("Document translation failed: {message}")]
    DocumentTranslation {
        /// Human readable description
        message: String,
        /// Handle of the uploaded document, if the upload went through
        handle: Option<DocumentHandle>,
        /// Underlying failure
        #[source]
        source: Option<Box<DeepLError>>,
    },

    /// The caller cancelled the operation
    #[error("Operation was cancelled")]
    Cancelled,

    /// A successful response whose body could not be decoded
    #[error("Failed to parse API response: {0}")]
    InvalidResponse(String),

    /// Caller input rejected before any request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing a local file failed
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tag identifying the kind of a [`DeepLError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Authorization,
    QuotaExceeded,
    NotFound,
    GlossaryNotFound,
    BadRequest,
    TooManyRequests,
    DocumentNotReady,
    ServiceUnavailable,
    /// Unexpected status code
    Api(u16),
    DocumentTranslation,
    Cancelled,
    InvalidResponse,
    InvalidArgument,
    Io,
}

impl ErrorKind {
    /// Build the error for this kind with the given message
    pub fn into_error(self, message: impl Into<String>) -> DeepLError {
        let message = message.into();
        match self {
            Self::Connection => DeepLError::Connection(message),
            Self::Authorization => DeepLError::Authorization(message),
            Self::QuotaExceeded => DeepLError::QuotaExceeded(message),
            Self::NotFound => DeepLError::NotFound(message),
            Self::GlossaryNotFound => DeepLError::GlossaryNotFound(message),
            Self::BadRequest => DeepLError::BadRequest(message),
            Self::TooManyRequests => DeepLError::TooManyRequests(message),
            Self::DocumentNotReady => DeepLError::DocumentNotReady(message),
            Self::ServiceUnavailable => DeepLError::ServiceUnavailable(message),
            Self::Api(status_code) => DeepLError::Api { status_code, message },
            Self::DocumentTranslation => DeepLError::DocumentTranslation {
                message,
                handle: None,
                source: None,
            },
            Self::Cancelled => DeepLError::Cancelled,
            Self::InvalidResponse => DeepLError::InvalidResponse(message),
            Self::InvalidArgument => DeepLError::InvalidArgument(message),
            Self::Io => DeepLError::Io(std::io::Error::other(message)),
        }
    }
}

impl DeepLError {
    /// The kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::GlossaryNotFound(_) => ErrorKind::GlossaryNotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::TooManyRequests(_) => ErrorKind::TooManyRequests,
            Self::DocumentNotReady(_) => ErrorKind::DocumentNotReady,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Api { status_code, .. } => ErrorKind::Api(*status_code),
            Self::DocumentTranslation { .. } => ErrorKind::DocumentTranslation,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Wrap a failure that happened during a document translation
    ///
    /// An error that already is a document translation error is not wrapped a
    /// second time; it only picks up the handle if it had none.
    pub fn document_failure(error: DeepLError, handle: Option<DocumentHandle>) -> Self {
        match error {
            Self::DocumentTranslation {
                message,
                handle: existing,
                source,
            } => Self::DocumentTranslation {
                message,
                handle: existing.or(handle),
                source,
            },
            other => {
                let message = if other.is_cancelled() {
                    "document translation was cancelled".to_string()
                } else {
                    format!("error occurred while translating document: {}", other)
                };
                Self::DocumentTranslation {
                    message,
                    handle,
                    source: Some(Box::new(other)),
                }
            }
        }
    }

    /// The document handle attached to this error, if any
    pub fn document_handle(&self) -> Option<&DocumentHandle> {
        match self {
            Self::DocumentTranslation { handle, .. } => handle.as_ref(),
            _ => None,
        }
    }

    /// Whether the error is, or was caused by, caller cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::DocumentTranslation {
                source: Some(source),
                ..
            } => source.is_cancelled(),
            _ => false,
        }
    }
}
