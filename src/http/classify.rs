/*!
 * Classification of HTTP status codes into retry outcomes.
 *
 * The executor calls [`classify`] once per attempt. The decision table is
 * specific to the DeepL API: 456 signals an exhausted quota, 429 and most
 * 5xx codes are transient, and 503 is only ever retried by the document
 * download loop, never by the transport retry loop.
 */

use serde::Deserialize;

use crate::errors::ErrorKind;

const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_FORBIDDEN: u16 = 403;
const STATUS_NOT_FOUND: u16 = 404;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;
const STATUS_QUOTA_EXCEEDED: u16 = 456;
const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Flags describing the request a status code belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusContext {
    /// The request referenced a glossary
    pub using_glossary: bool,
    /// The request downloads a translated document
    pub downloading_document: bool,
}

impl StatusContext {
    pub fn glossary() -> Self {
        Self {
            using_glossary: true,
            ..Self::default()
        }
    }

    pub fn document_download() -> Self {
        Self {
            downloading_document: true,
            ..Self::default()
        }
    }
}

/// Outcome of one HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedOutcome {
    /// Status below 400
    Success,
    /// Transient failure, worth another attempt
    Retryable { kind: ErrorKind, message: String },
    /// Failure that retrying the same request will not fix
    Terminal { kind: ErrorKind, message: String },
}

impl ClassifiedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Classify a status code, using `body` to enrich the error message
pub fn classify(status: u16, body: &[u8], context: StatusContext) -> ClassifiedOutcome {
    if status < 400 {
        return ClassifiedOutcome::Success;
    }

    let status_text = format!("status code {}", status);
    let terminal = |kind: ErrorKind| ClassifiedOutcome::Terminal {
        kind,
        message: with_error_detail(&status_text, body),
    };

    match status {
        STATUS_FORBIDDEN => terminal(ErrorKind::Authorization),
        STATUS_QUOTA_EXCEEDED => terminal(ErrorKind::QuotaExceeded),
        STATUS_NOT_FOUND if context.using_glossary => terminal(ErrorKind::GlossaryNotFound),
        STATUS_NOT_FOUND => terminal(ErrorKind::NotFound),
        STATUS_BAD_REQUEST => terminal(ErrorKind::BadRequest),
        STATUS_TOO_MANY_REQUESTS => ClassifiedOutcome::Retryable {
            kind: ErrorKind::TooManyRequests,
            message: with_error_detail(&status_text, body),
        },
        STATUS_SERVICE_UNAVAILABLE if context.downloading_document => {
            terminal(ErrorKind::DocumentNotReady)
        }
        STATUS_SERVICE_UNAVAILABLE => terminal(ErrorKind::ServiceUnavailable),
        500..=599 => ClassifiedOutcome::Retryable {
            kind: ErrorKind::Api(status),
            message: with_error_detail("server error", body),
        },
        _ => terminal(ErrorKind::Api(status)),
    }
}

/// Append the `message`/`detail` fields of a JSON error body, if there are any
pub fn with_error_detail(base: &str, body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let mut message = base.to_string();

    if let Some(server_message) = parsed.message.filter(|m| !m.is_empty()) {
        message.push_str(", message: ");
        message.push_str(&server_message);
    }
    if let Some(detail) = parsed.detail.filter(|d| !d.is_empty()) {
        message.push_str(", detail: ");
        message.push_str(&detail);
    }
    message
}
