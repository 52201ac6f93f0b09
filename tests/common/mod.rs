/*!
 * Common test utilities for the deepl-client test suite
 */

use std::sync::Arc;
use std::time::Duration;

use deepl_client::http::{BackoffPolicy, RetryConfig};
use deepl_client::translation::{DocumentPolling, Translator, TranslatorOptions};


use self::mock_transport::MockTransport;

/// Auth key used by every test translator
pub const TEST_AUTH_KEY: &str = "test-key:fx";

/// Options with millisecond timings so retry and polling tests run fast
pub fn fast_options() -> TranslatorOptions {
    TranslatorOptions {
        server_url: Some("http://mock.deepl.test".to_string()),
        retry: RetryConfig {
            per_attempt_timeout: Duration::from_millis(200),
            max_retries: 5,
        },
        backoff: BackoffPolicy {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(5),
            multiplier: 1.6,
            jitter: 0.0,
        },
        document: DocumentPolling {
            poll_interval: Duration::from_millis(5),
            download_retries: 5,
            download_retry_delay: Duration::from_millis(1),
        },
        ..TranslatorOptions::default()
    }
}

/// Build a translator on top of the given mock
pub fn translator_with(transport: &Arc<MockTransport>, options: TranslatorOptions) -> Translator {
    Translator::with_transport(TEST_AUTH_KEY, options, transport.clone())
        .expect("test translator should build")
}

/// JSON body of a successful `/v2/translate` response
pub fn translate_body(translations: &[(&str, u64)]) -> String {
    let items: Vec<serde_json::Value> = translations
        .iter()
        .map(|(text, billed)| {
            serde_json::json!({
                "detected_source_language": "EN",
                "text": text,
                "billed_characters": billed,
            })
        })
        .collect();
    serde_json::json!({ "translations": items }).to_string()
}

/// JSON body of a document status response
pub fn status_body(state: &str) -> String {
    serde_json::json!({ "document_id": "doc-1", "status": state }).to_string()
}

/// JSON body of a successful document upload
pub fn upload_body() -> String {
    serde_json::json!({ "document_id": "doc-1", "document_key": "key-1" }).to_string()
}

/// Optional log output while debugging tests (`RUST_LOG=debug`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
