//! Tests for `LastFmClient`.

use super::{
    ApiMethod, ApiOutcome, HttpClient, HttpError, HttpRequest, HttpResponse, LastFmClient,
    LastFmCredentials, RetryPolicy, ScrobbleApi, UpstreamError, api_signature,
};
use crate::notification::TrackInfo;
use crate::time::{Clock, InstantSleeper, Sleeper};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Mock HTTP client that replays a scripted sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for Arc<RecordingSleeper> {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Clock that advances one second every time it is read.
#[derive(Debug)]
struct TickingClock {
    secs: AtomicU64,
}

impl TickingClock {
    fn starting_at(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.fetch_add(1, Ordering::SeqCst))
    }
}

fn json_response(status: http::StatusCode, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(
        status,
        http::HeaderMap::new(),
        body.as_bytes().to_vec(),
    ))
}

fn success() -> Result<HttpResponse, HttpError> {
    json_response(
        http::StatusCode::OK,
        r#"{"scrobbles":{"@attr":{"accepted":1,"ignored":0}}}"#,
    )
}

fn retryable(code: i64) -> Result<HttpResponse, HttpError> {
    json_response(
        http::StatusCode::SERVICE_UNAVAILABLE,
        &format!(r#"{{"error":{code},"message":"Operation failed - Most likely the backend service failed. Please try again."}}"#),
    )
}

fn credentials() -> LastFmCredentials {
    LastFmCredentials::new("test-api-key", "test-secret", "test-session")
}

fn airbag() -> TrackInfo {
    TrackInfo::new("Airbag", "Radiohead", "OK Computer")
}

fn test_client(
    mock: Arc<MockClient>,
) -> LastFmClient<Arc<MockClient>, InstantSleeper, TickingClock> {
    LastFmClient::new(mock, credentials())
        .with_sleeper(InstantSleeper)
        .with_clock(TickingClock::starting_at(1_700_000_000))
}

fn form_fields(request: &HttpRequest) -> HashMap<String, String> {
    url::form_urlencoded::parse(request.body.as_deref().unwrap())
        .into_owned()
        .collect()
}

mod builder {
    use super::*;

    #[test]
    fn new_uses_public_endpoint_and_default_policy() {
        let client = LastFmClient::new(Arc::new(MockClient::new(vec![])), credentials());

        assert_eq!(
            client.endpoint().as_str(),
            "https://ws.audioscrobbler.com/2.0/"
        );
        assert_eq!(*client.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn with_endpoint_and_policy_override_defaults() {
        let endpoint = url::Url::parse("http://localhost:9000/2.0/").unwrap();
        let client = LastFmClient::new(Arc::new(MockClient::new(vec![])), credentials())
            .with_endpoint(endpoint.clone())
            .with_retry_policy(RetryPolicy::new().with_max_attempts(2));

        assert_eq!(*client.endpoint(), endpoint);
        assert_eq!(client.retry_policy().max_attempts, 2);
    }
}

mod request_shape {
    use super::*;

    #[tokio::test]
    async fn posts_signed_form_to_endpoint() {
        let mock = Arc::new(MockClient::new(vec![success()]));
        let client = test_client(mock.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;
        assert!(outcome.is_success());

        let requests = mock.captured_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, http::Method::POST);
        assert_eq!(
            requests[0].url.as_str(),
            "https://ws.audioscrobbler.com/2.0/"
        );
        assert_eq!(
            requests[0].headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );

        let fields = form_fields(&requests[0]);
        assert_eq!(fields["method"], "track.scrobble");
        assert_eq!(fields["artist"], "Radiohead");
        assert_eq!(fields["track"], "Airbag");
        assert_eq!(fields["album"], "OK Computer");
        assert_eq!(fields["timestamp"], "1700000000");
        assert_eq!(fields["api_key"], "test-api-key");
        assert_eq!(fields["sk"], "test-session");
        assert_eq!(fields["format"], "json");
        assert_eq!(fields["api_sig"], "dd0a283943bc3d6e4736905e8cb2e137");
    }

    #[tokio::test]
    async fn now_playing_uses_update_method() {
        let mock = Arc::new(MockClient::new(vec![json_response(
            http::StatusCode::OK,
            r#"{"nowplaying":{}}"#,
        )]));
        let client = test_client(mock.clone());

        client.execute(ApiMethod::UpdateNowPlaying, &airbag()).await;

        let fields = form_fields(&mock.captured_requests()[0]);
        assert_eq!(fields["method"], "track.updateNowPlaying");
    }

    #[tokio::test]
    async fn each_attempt_gets_fresh_timestamp_and_signature() {
        let mock = Arc::new(MockClient::new(vec![retryable(16), success()]));
        let client = test_client(mock.clone());

        client.execute(ApiMethod::Scrobble, &airbag()).await;

        let requests = mock.captured_requests();
        let first = form_fields(&requests[0]);
        let second = form_fields(&requests[1]);
        assert_eq!(first["timestamp"], "1700000000");
        assert_eq!(second["timestamp"], "1700000001");
        assert_ne!(first["api_sig"], second["api_sig"]);

        let signed: Vec<(&str, &str)> = second
            .iter()
            .filter(|(k, _)| *k != "api_sig" && *k != "format")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(api_signature(signed, "test-secret"), second["api_sig"]);
    }
}

mod retry_behavior {
    use super::*;

    #[tokio::test]
    async fn always_retryable_makes_five_attempts_then_fails() {
        let mock = Arc::new(MockClient::new((0..5).map(|_| retryable(11)).collect()));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = test_client(mock.clone()).with_sleeper(sleeper.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 5);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(2000); 4]);
        assert!(matches!(
            outcome,
            ApiOutcome::FatalFailure(UpstreamError::RetriesExhausted {
                attempts: 5,
                code: 11,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn recovers_when_third_attempt_succeeds() {
        let mock = Arc::new(MockClient::new(vec![
            retryable(16),
            retryable(11),
            json_response(
                http::StatusCode::OK,
                r#"{"scrobbles":{"@attr":{"accepted":1,"ignored":0}},"attempt":3}"#,
            ),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = test_client(mock.clone()).with_sleeper(sleeper.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 3);
        assert_eq!(sleeper.delays().len(), 2);
        let ApiOutcome::Success(response) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(response.body["attempt"], 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_after_one_call() {
        let mock = Arc::new(MockClient::new(vec![json_response(
            http::StatusCode::FORBIDDEN,
            r#"{"error":9,"message":"Invalid session key - Please re-authenticate"}"#,
        )]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = test_client(mock.clone()).with_sleeper(sleeper.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 1);
        assert!(sleeper.delays().is_empty());
        assert!(matches!(
            outcome,
            ApiOutcome::FatalFailure(UpstreamError::Api { code: 9, .. })
        ));
    }

    #[tokio::test]
    async fn transport_error_is_not_retried() {
        let mock = Arc::new(MockClient::new(vec![Err(HttpError::Timeout), success()]));
        let client = test_client(mock.clone());

        let outcome = client.execute(ApiMethod::UpdateNowPlaying, &airbag()).await;

        assert_eq!(mock.calls(), 1);
        assert!(matches!(
            outcome,
            ApiOutcome::TransportFailure(HttpError::Timeout)
        ));
    }

    #[tokio::test]
    async fn transport_error_after_retryable_stops_the_loop() {
        let mock = Arc::new(MockClient::new(vec![
            retryable(16),
            Err(HttpError::Connection(Box::new(std::io::Error::other(
                "connection reset",
            )))),
            success(),
        ]));
        let client = test_client(mock.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 2);
        assert!(matches!(outcome, ApiOutcome::TransportFailure(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_fatal_without_retry() {
        let mock = Arc::new(MockClient::new(vec![
            json_response(http::StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"),
            success(),
        ]));
        let client = test_client(mock.clone());

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 1);
        assert!(matches!(
            outcome,
            ApiOutcome::FatalFailure(UpstreamError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn custom_policy_bounds_attempts() {
        let mock = Arc::new(MockClient::new((0..2).map(|_| retryable(16)).collect()));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = test_client(mock.clone())
            .with_sleeper(sleeper.clone())
            .with_retry_policy(
                RetryPolicy::new()
                    .with_max_attempts(2)
                    .with_delay(Duration::from_millis(10)),
            );

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        assert_eq!(mock.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(10)]);
        assert!(matches!(
            outcome,
            ApiOutcome::FatalFailure(UpstreamError::RetriesExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_calls_keep_separate_attempt_counts() {
        let mock = Arc::new(MockClient::new(vec![
            retryable(16),
            success(),
            success(),
        ]));
        let client = test_client(mock.clone());

        let track = airbag();
        let (a, b) = tokio::join!(
            client.execute(ApiMethod::Scrobble, &track),
            client.execute(ApiMethod::UpdateNowPlaying, &track),
        );

        assert!(a.is_success());
        assert!(b.is_success());
        assert_eq!(mock.calls(), 3);
    }
}

mod success_payload {
    use super::*;

    #[tokio::test]
    async fn ignored_scrobbles_stay_successful() {
        let mock = Arc::new(MockClient::new(vec![json_response(
            http::StatusCode::OK,
            r#"{"scrobbles":{"@attr":{"accepted":0,"ignored":1}}}"#,
        )]));
        let client = test_client(mock);

        let outcome = client.execute(ApiMethod::Scrobble, &airbag()).await;

        let ApiOutcome::Success(response) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(response.ignored, 1);
    }
}
