/*!
 * Tests for the backoff policy and status classification
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

use deepl_client::errors::ErrorKind;
use deepl_client::http::{BackoffPolicy, ClassifiedOutcome, StatusContext, classify};

#[test]
fn test_backoff_defaultPolicy_shouldGrowAndCap() {
    let policy = BackoffPolicy::default().without_jitter();
    assert_eq!(policy.base_delay(1), Duration::from_secs(1));
    assert!(policy.base_delay(2) > policy.base_delay(1));
    assert!(policy.base_delay(5) > policy.base_delay(4));
    assert_eq!(policy.base_delay(50), Duration::from_secs(120));
    assert_eq!(policy.delay(50), Duration::from_secs(120));
}

#[test]
fn test_backoff_withJitter_shouldStayWithinEnvelope() {
    let policy = BackoffPolicy::default();
    let mut rng = StdRng::seed_from_u64(7);
    for attempt in 1..=12 {
        let base = policy.base_delay(attempt).as_secs_f64();
        let delay = policy.delay_with(attempt, &mut rng).as_secs_f64();
        assert!(delay >= base * (1.0 - policy.jitter) - 1e-6, "attempt {attempt}: {delay}");
        assert!(delay <= base * (1.0 + policy.jitter) + 1e-6, "attempt {attempt}: {delay}");
    }
}

#[test]
fn test_backoff_upperBound_shouldCoverJitteredMax() {
    let policy = BackoffPolicy::default();
    assert!(policy.upper_bound() >= Duration::from_secs(120));
    assert!(policy.upper_bound() <= Duration::from_secs_f64(120.0 * 1.23 + 1e-3));
}

#[test]
fn test_classify_statusTable_shouldMatchTaxonomy() {
    let none = StatusContext::default();
    assert!(classify(200, b"{}", none).is_success());
    assert!(classify(204, b"", none).is_success());

    let cases = [
        (403, ErrorKind::Authorization, false),
        (456, ErrorKind::QuotaExceeded, false),
        (404, ErrorKind::NotFound, false),
        (400, ErrorKind::BadRequest, false),
        (429, ErrorKind::TooManyRequests, true),
        (503, ErrorKind::ServiceUnavailable, false),
        (500, ErrorKind::Api(500), true),
        (504, ErrorKind::Api(504), true),
        (418, ErrorKind::Api(418), false),
    ];
    for (status, expected_kind, retryable) in cases {
        match classify(status, b"", none) {
            ClassifiedOutcome::Retryable { kind, .. } => {
                assert!(retryable, "{status} should not be retried");
                assert_eq!(kind, expected_kind);
            }
            ClassifiedOutcome::Terminal { kind, .. } => {
                assert!(!retryable, "{status} should be retried");
                assert_eq!(kind, expected_kind);
            }
            ClassifiedOutcome::Success => panic!("{status} classified as success"),
        }
    }
}

#[test]
fn test_classify_contextSensitiveStatuses_shouldUseContext() {
    assert!(matches!(
        classify(404, b"", StatusContext::glossary()),
        ClassifiedOutcome::Terminal { kind: ErrorKind::GlossaryNotFound, .. }
    ));
    assert!(matches!(
        classify(503, b"", StatusContext::document_download()),
        ClassifiedOutcome::Terminal { kind: ErrorKind::DocumentNotReady, .. }
    ));
}

#[test]
fn test_classify_withErrorBody_shouldIncludeDetail() {
    let body = br#"{"message": "Value for 'target_lang' not supported."}"#;
    match classify(400, body, StatusContext::default()) {
        ClassifiedOutcome::Terminal { message, .. } => {
            assert!(message.contains("400"));
            assert!(message.contains("target_lang"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
