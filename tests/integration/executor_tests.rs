/*!
 * Integration tests for the retrying request executor
 */

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

use deepl_client::errors::DeepLError;
use deepl_client::http::{
    BackoffPolicy, HttpRequest, RequestExecutor, RetryConfig, StatusContext, TransportError,
};

use crate::common::mock_transport::{MockReply, MockTransport};

fn executor(transport: &Arc<MockTransport>, retry: RetryConfig, backoff: BackoffPolicy) -> RequestExecutor {
    RequestExecutor::new(
        transport.clone(),
        Url::parse("http://mock.deepl.test/").unwrap(),
        vec![("Authorization".to_string(), "DeepL-Auth-Key k".to_string())],
        retry,
        backoff,
    )
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        per_attempt_timeout: Duration::from_millis(200),
        max_retries,
    }
}

fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy {
        initial: Duration::from_millis(1),
        max: Duration::from_millis(4),
        multiplier: 2.0,
        jitter: 0.0,
    }
}

#[tokio::test]
async fn test_execute_transientThenSuccess_shouldRetryUntilSuccess() {
    let transport = MockTransport::sequence(vec![
        MockReply::status(500),
        MockReply::status(429),
        MockReply::Error(TransportError::Connect("refused".to_string())),
        MockReply::ok("{}"),
    ]);
    let executor = executor(&transport, fast_retry(5), fast_backoff());

    let response = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(transport.request_count(), 4);
}

#[tokio::test]
async fn test_execute_failsExactlyMaxRetriesTimes_shouldSucceedOnLastAttempt() {
    let max_retries = 3;
    let transport = MockTransport::sequence(vec![
        MockReply::status(502),
        MockReply::status(502),
        MockReply::status(502),
        MockReply::ok("{}"),
    ]);
    let executor = executor(&transport, fast_retry(max_retries), fast_backoff());

    let response = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(transport.request_count(), max_retries as usize + 1);
}

#[tokio::test]
async fn test_execute_failsOneMoreThanMaxRetries_shouldGiveUp() {
    let max_retries = 3;
    let transport = MockTransport::sequence(vec![
        MockReply::status(502),
        MockReply::status(502),
        MockReply::status(502),
        MockReply::status(502),
        MockReply::ok("{}"),
    ]);
    let executor = executor(&transport, fast_retry(max_retries), fast_backoff());

    let error = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(error, DeepLError::Api { status_code: 502, .. }),
        "{error:?}"
    );
    assert_eq!(transport.request_count(), max_retries as usize + 1);
}

#[tokio::test]
async fn test_execute_alwaysRateLimited_shouldStopAfterMaxRetries() {
    let transport = MockTransport::sequence(vec![MockReply::status(429)]);
    let executor = executor(&transport, fast_retry(5), fast_backoff());

    let error = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::TooManyRequests(_)), "{error:?}");
    assert_eq!(transport.request_count(), 6);
}

#[tokio::test]
async fn test_execute_exhaustedServerErrors_shouldReturnApiErrorWithStatus() {
    let transport = MockTransport::sequence(vec![MockReply::Response(
        502,
        r#"{"message": "upstream down"}"#.to_string(),
    )]);
    let executor = executor(&transport, fast_retry(2), fast_backoff());

    let error = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match error {
        DeepLError::Api { status_code, message } => {
            assert_eq!(status_code, 502);
            assert!(message.contains("upstream down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_execute_zeroRetries_shouldMakeSingleAttempt() {
    let transport = MockTransport::sequence(vec![MockReply::status(500)]);
    let executor = executor(&transport, fast_retry(0), fast_backoff());

    let result = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_execute_terminalStatuses_shouldNotRetry() {
    let cases: [(u16, fn(&DeepLError) -> bool); 5] = [
        (403, |e| matches!(e, DeepLError::Authorization(_))),
        (456, |e| matches!(e, DeepLError::QuotaExceeded(_))),
        (400, |e| matches!(e, DeepLError::BadRequest(_))),
        (404, |e| matches!(e, DeepLError::NotFound(_))),
        (503, |e| matches!(e, DeepLError::ServiceUnavailable(_))),
    ];

    for (status, is_expected) in cases {
        let transport = MockTransport::sequence(vec![MockReply::status(status)]);
        let executor = executor(&transport, fast_retry(5), fast_backoff());
        let error = executor
            .execute(
                &HttpRequest::get("/v2/usage"),
                StatusContext::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(is_expected(&error), "status {status} gave {error:?}");
        assert_eq!(transport.request_count(), 1, "status {status} was retried");
    }
}

#[tokio::test]
async fn test_execute_attemptTimeout_shouldRetryAsConnectionError() {
    let transport = MockTransport::sequence(vec![
        MockReply::ok("{}").delayed(Duration::from_secs(5)),
        MockReply::ok("{}"),
    ]);
    let executor = executor(&transport, fast_retry(1), fast_backoff());

    let started = Instant::now();
    let response = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(transport.request_count(), 2);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_execute_allAttemptsTimeOut_shouldReturnConnectionError() {
    let transport =
        MockTransport::sequence(vec![MockReply::ok("{}").delayed(Duration::from_secs(5))]);
    let retry = RetryConfig {
        per_attempt_timeout: Duration::from_millis(20),
        max_retries: 2,
    };
    let executor = executor(&transport, retry, fast_backoff());

    let error = executor
        .execute(
            &HttpRequest::get("/v2/usage"),
            StatusContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::Connection(_)), "{error:?}");
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_execute_cancelledDuringBackoff_shouldStopPromptly() {
    let transport = MockTransport::sequence(vec![MockReply::status(500)]);
    let slow_backoff = BackoffPolicy {
        initial: Duration::from_secs(10),
        max: Duration::from_secs(60),
        ..fast_backoff()
    };
    let executor = executor(&transport, fast_retry(5), slow_backoff);
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let error = executor
        .execute(&HttpRequest::get("/v2/usage"), StatusContext::default(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::Cancelled));
    assert_eq!(transport.request_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_execute_cancelledDuringRequest_shouldAbandonAttempt() {
    let transport =
        MockTransport::sequence(vec![MockReply::ok("{}").delayed(Duration::from_secs(10))]);
    let retry = RetryConfig {
        per_attempt_timeout: Duration::from_secs(30),
        max_retries: 5,
    };
    let executor = executor(&transport, retry, fast_backoff());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let error = executor
        .execute(&HttpRequest::get("/v2/usage"), StatusContext::default(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(transport.max_in_flight(), 1);
}

#[tokio::test]
async fn test_execute_headers_shouldMergeClientAndRequestHeaders() {
    let transport = MockTransport::sequence(vec![MockReply::ok("")]);
    let executor = executor(&transport, fast_retry(0), fast_backoff());

    executor
        .execute(
            &HttpRequest::get("/v2/glossaries/g1/entries").header("Accept", "text/tab-separated-values"),
            StatusContext::glossary(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let recorded = &transport.requests()[0];
    let headers = &recorded.request.headers;
    assert!(headers.contains(&("Authorization".to_string(), "DeepL-Auth-Key k".to_string())));
    assert!(headers.contains(&("Accept".to_string(), "text/tab-separated-values".to_string())));
    assert_eq!(recorded.url.as_str(), "http://mock.deepl.test/v2/glossaries/g1/entries");
}
