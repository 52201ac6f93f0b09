/*!
 * HTTP execution layer.
 *
 * - `backoff`: retry delay computation
 * - `classify`: status code classification
 * - `request`: owned request/response values
 * - `transport`: transport trait and the reqwest implementation
 * - `executor`: retrying request executor
 */

pub mod backoff;
pub mod classify;
pub mod executor;
pub mod request;
pub mod transport;

pub use self::backoff::BackoffPolicy;
pub use self::classify::{ClassifiedOutcome, StatusContext, classify};
pub use self::executor::{RequestExecutor, RetryConfig};
pub use self::request::{FilePart, HttpRequest, HttpResponse, RequestBody};
pub use self::transport::{ReqwestTransport, Transport, TransportError};

/// Make sure a base URL ends with a slash so relative joins keep its path
pub(crate) fn normalize_base_url(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
