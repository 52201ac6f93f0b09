/*!
 * # deepl-client - A resilient DeepL API client
 *
 * A Rust library for the DeepL translation API that keeps working when the
 * network or the service does not.
 *
 * ## Features
 *
 * - Text translation with formality, glossary and markup options
 * - Document translation: upload, poll until done, download
 * - Batch translation of the same texts into many target languages
 * - Glossary management, usage and supported languages
 * - Retries with exponential backoff and jitter on rate limits and server errors
 * - Per-attempt timeouts and cooperative cancellation of every operation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `http`: Request execution:
 *   - `http::backoff`: Retry delay policy
 *   - `http::classify`: Status code classification
 *   - `http::transport`: Transport seam and the reqwest implementation
 *   - `http::executor`: Retrying, cancellable request executor
 * - `translation`: API operations on [`Translator`]:
 *   - `translation::text`: Text translation
 *   - `translation::document`: Document translation workflow
 *   - `translation::batch`: Multi-target fan-out
 *   - `translation::glossary`: Glossaries
 *   - `translation::account`: Usage and languages
 * - `errors`: Error types for the library
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod http;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{DeepLError, ErrorKind, Result};
pub use http::{BackoffPolicy, RetryConfig, Transport};
pub use translation::{
    BatchResult, BatchTarget, BatchTranslator, DocumentHandle, TextResult, TextTranslateOptions,
    Translator, TranslatorOptions,
};
