/*!
 * Core translator client.
 *
 * This module contains the [`Translator`] struct, the entry point for every
 * API operation, and [`TranslatorOptions`], its explicit configuration.
 * The operations themselves live in the sibling modules (`text`, `document`,
 * `batch`, `glossary`, `account`) as further `impl Translator` blocks.
 */

use std::sync::Arc;
use url::Url;

use super::document::DocumentPolling;
use crate::errors::{DeepLError, Result};
use crate::http::{
    BackoffPolicy, ReqwestTransport, RequestExecutor, RetryConfig, Transport, normalize_base_url,
};

/// Server used for auth keys of free accounts
pub const DEEPL_SERVER_URL_FREE: &str = "https://api-free.deepl.com";

/// Server used for auth keys of pro accounts
pub const DEEPL_SERVER_URL: &str = "https://api.deepl.com";

/// Name and version of the application embedding this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Options for constructing a [`Translator`]
#[derive(Debug, Clone, Default)]
pub struct TranslatorOptions {
    /// Server URL override; derived from the auth key when `None`
    pub server_url: Option<String>,

    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,

    /// Per-attempt timeout and retry count
    pub retry: RetryConfig,

    /// Delay between retries
    pub backoff: BackoffPolicy,

    /// Document polling and download timing
    pub document: DocumentPolling,

    /// Application identification appended to the user agent
    pub app_info: Option<AppInfo>,
}

/// Client for the DeepL API
///
/// Cheap to clone; clones share the underlying transport and configuration.
#[derive(Debug, Clone)]
pub struct Translator {
    executor: Arc<RequestExecutor>,
    polling: DocumentPolling,
}

impl Translator {
    /// Create a translator talking to the real API over reqwest
    pub fn new(auth_key: &str, options: TranslatorOptions) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(auth_key, options, transport)
    }

    /// Create a translator on top of a custom transport
    pub fn with_transport(
        auth_key: &str,
        options: TranslatorOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let auth_key = auth_key.trim();
        if auth_key.is_empty() {
            return Err(DeepLError::InvalidArgument(
                "auth key must not be empty".to_string(),
            ));
        }

        let server_url = match options.server_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ if is_free_account_auth_key(auth_key) => DEEPL_SERVER_URL_FREE.to_string(),
            _ => DEEPL_SERVER_URL.to_string(),
        };
        let server_url = Url::parse(&server_url).map_err(|e| {
            DeepLError::InvalidArgument(format!("invalid server URL '{}': {}", server_url, e))
        })?;

        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("DeepL-Auth-Key {}", auth_key),
            ),
            ("User-Agent".to_string(), user_agent(options.app_info.as_ref())),
        ];
        headers.extend(options.headers);

        let executor = RequestExecutor::new(
            transport,
            normalize_base_url(server_url),
            headers,
            options.retry,
            options.backoff,
        );

        Ok(Self {
            executor: Arc::new(executor),
            polling: options.document,
        })
    }

    /// The server all requests are sent to
    pub fn server_url(&self) -> &Url {
        self.executor.server_url()
    }

    /// Document polling configuration in effect
    pub fn document_polling(&self) -> &DocumentPolling {
        &self.polling
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}

/// Whether the auth key belongs to a free account
pub fn is_free_account_auth_key(auth_key: &str) -> bool {
    auth_key.trim().ends_with(":fx")
}

fn user_agent(app_info: Option<&AppInfo>) -> String {
    let mut agent = format!("deepl-client-rust/{}", env!("CARGO_PKG_VERSION"));
    if let Some(info) = app_info {
        agent.push_str(&format!(" {}/{}", info.name, info.version));
    }
    agent
}
