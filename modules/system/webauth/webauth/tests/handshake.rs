#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end handshake tests
//!
//! These tests wire the module from configuration with the bundled parser and
//! request cache, and verify that:
//! 1. Requests without a WLS response are rejected with `MissingCredentials`
//! 2. A valid response for a cached request yields an authenticated token
//! 3. Validator failures are classified by the response status
//! 4. A malformed response is reported before the cache is consulted
//! 5. Resolver failures and contract breaches are kept apart

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use http::header::{COOKIE, HOST};
use http::{HeaderValue, Method};
use time::OffsetDateTime;
use time::macros::datetime;
use webauth::config::WebauthConfig;
use webauth::domain::{
    AnyRequestMatcher, ChallengeCreator, Collaborators, EntryPoint, Service, WebauthLocalClient,
};
use webauth::infra::{InMemoryRequestCache, WlsResponseParser};
use webauth::module;
use webauth_sdk::{
    Authority, AuthenticationError, ChallengeDescriptor, ChallengeError, ChallengeParameter,
    Clock, CredentialToken, PrincipalResolver, RequestDescriptor, ResolvedPrincipal,
    ResolverError, ResponseDescriptor, ResponseValidator, UserIdentity, ValidationError,
    WebauthClient,
};

const RECEIVED_AT: OffsetDateTime = datetime!(2016-08-11 15:58:20 UTC);

/// Validator that accepts or rejects everything and records what it saw
struct RecordingValidator {
    accept: bool,
    calls: AtomicUsize,
    seen_millis: std::sync::Mutex<Option<i64>>,
}

impl RecordingValidator {
    fn new(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            accept,
            calls: AtomicUsize::new(0),
            seen_millis: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl ResponseValidator for RecordingValidator {
    async fn validate(
        &self,
        challenge: &ChallengeDescriptor,
        response: &ResponseDescriptor,
        received_at_epoch_millis: i64,
    ) -> Result<(), ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_millis.lock().unwrap() = Some(received_at_epoch_millis);
        if !self.accept {
            return Err(ValidationError::new(format!(
                "rejected response with status {}",
                response.status()
            )));
        }
        if challenge.return_url() != Some(response.url()) {
            return Err(ValidationError::new("url mismatch"));
        }
        Ok(())
    }
}

/// Resolver granting a fixed authority to a known user
struct DirectoryResolver;

#[async_trait]
impl PrincipalResolver for DirectoryResolver {
    async fn resolve(&self, token: &CredentialToken) -> Result<ResolvedPrincipal, ResolverError> {
        match token.principal().name() {
            "hwtb2" => Ok(ResolvedPrincipal {
                principal: webauth_sdk::Principal::User(
                    UserIdentity::new("hwtb2").with_display_name("H. W. T. B."),
                ),
                authorities: [Authority::new("ROLE_READER")].into_iter().collect(),
            }),
            other => Err(ResolverError::PrincipalNotFound {
                principal: other.to_owned(),
            }),
        }
    }
}

/// Resolver that hands the unauthenticated token straight back
struct BrokenResolver;

#[async_trait]
impl PrincipalResolver for BrokenResolver {
    async fn resolve(&self, _token: &CredentialToken) -> Result<ResolvedPrincipal, ResolverError> {
        Err(ResolverError::Internal("not used".to_owned()))
    }

    async fn create_authenticated_token(
        &self,
        token: &CredentialToken,
    ) -> Result<CredentialToken, ResolverError> {
        Ok(token.clone())
    }
}

/// Clock counting how often it is read
struct CountingClock {
    reads: AtomicUsize,
}

impl Clock for CountingClock {
    fn now(&self) -> OffsetDateTime {
        self.reads.fetch_add(1, Ordering::SeqCst);
        RECEIVED_AT
    }
}

fn wls_token(status: &str, principal: &str, url: &str) -> String {
    [
        "3",
        status,
        "",
        "20160811T155817Z",
        "1470931097-27163-123",
        url,
        principal,
        "current",
        "pwd",
        "",
        "9793",
        "",
        "2",
        "c2lnbmF0dXJl",
    ]
    .join("!")
}

fn original_request() -> RequestDescriptor {
    RequestDescriptor::new(Method::GET, "/private?page=2".parse().unwrap())
        .with_header(HOST, HeaderValue::from_static("app.example.com"))
        .with_header(COOKIE, HeaderValue::from_static("SESSION=s1"))
}

fn callback(token: Option<&str>, session: &'static str) -> RequestDescriptor {
    let uri = match token {
        Some(token) => format!("/login?WLS-Response={}", urlencoding::encode(token)),
        None => "/login?x=y".to_owned(),
    };
    RequestDescriptor::new(Method::GET, uri.parse().unwrap())
        .with_header(HOST, HeaderValue::from_static("app.example.com"))
        .with_header(COOKIE, HeaderValue::from_static(session))
}

struct Harness {
    client: Arc<dyn WebauthClient>,
    cache: Arc<InMemoryRequestCache>,
    clock: Arc<CountingClock>,
}

fn harness(validator: Arc<RecordingValidator>, resolver: Arc<dyn PrincipalResolver>) -> Harness {
    let cfg = WebauthConfig::default();
    let clock = Arc::new(CountingClock {
        reads: AtomicUsize::new(0),
    });
    let (collaborators, cache) = module::default_collaborators(&cfg, validator, resolver);
    let collaborators = collaborators.with_clock(clock.clone());
    let client = module::init(&cfg, collaborators, Arc::new(AnyRequestMatcher)).unwrap();
    Harness {
        client,
        cache,
        clock,
    }
}

const RETURN_URL: &str = "https://app.example.com/private?page=2";

#[tokio::test]
async fn request_without_response_is_missing_credentials() {
    let h = harness(RecordingValidator::new(true), Arc::new(DirectoryResolver));

    let request = callback(None, "SESSION=s1");
    assert!(!h.client.requires_authentication(&request));

    let err = h.client.authenticate(&request).await.unwrap_err();
    assert_eq!(
        err,
        AuthenticationError::MissingCredentials {
            parameter: "WLS-Response".to_owned()
        }
    );
}

#[tokio::test]
async fn valid_response_authenticates_with_resolved_principal() {
    let validator = RecordingValidator::new(true);
    let h = harness(validator.clone(), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let request = callback(Some(&wls_token("200", "hwtb2", RETURN_URL)), "SESSION=s1");
    assert!(h.client.requires_authentication(&request));

    let token = h.client.authenticate(&request).await.unwrap();

    assert!(token.is_authenticated());
    assert_eq!(token.principal().name(), "hwtb2");
    assert_eq!(
        token.authorities(),
        &[Authority::new("ROLE_READER")].into_iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(token.received_at(), Some(RECEIVED_AT));
    assert_eq!(token.challenge().and_then(ChallengeDescriptor::return_url), Some(RETURN_URL));
    assert_eq!(token.response().map(ResponseDescriptor::id), Some("1470931097-27163-123"));

    assert_eq!(h.clock.reads.load(Ordering::SeqCst), 1);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *validator.seen_millis.lock().unwrap(),
        Some(RECEIVED_AT.unix_timestamp() * 1000)
    );

    // Original request stays cached for the post-login redirect
    assert_eq!(h.cache.len(), 1);

    let erased = token.erase_credentials();
    assert!(erased.is_authenticated());
    assert_eq!(erased.principal().name(), "hwtb2");
    assert!(erased.challenge().is_none());
    assert!(erased.response().is_none());
    assert!(erased.received_at().is_none());
}

#[tokio::test]
async fn cancelled_login_is_bad_status() {
    let h = harness(RecordingValidator::new(false), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(Some(&wls_token("410", "", RETURN_URL)), "SESSION=s1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthenticationError::BadStatusCredentials { status: 410, .. }
    ));
    assert_eq!(
        err.public_message(),
        "Login was not completed: the user cancelled the authentication request."
    );
}

#[tokio::test]
async fn rejected_successful_status_is_validation_failure() {
    let h = harness(RecordingValidator::new(true), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(
            Some(&wls_token("200", "hwtb2", "https://elsewhere.example.com/")),
            "SESSION=s1",
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AuthenticationError::ValidationFailed(ValidationError::new("url mismatch"))
    );
    assert!(!err.is_server_fault());
}

#[tokio::test]
async fn cache_miss_is_original_request_lost() {
    let validator = RecordingValidator::new(true);
    let h = harness(validator.clone(), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(Some(&wls_token("200", "hwtb2", RETURN_URL)), "SESSION=other"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthenticationError::OriginalRequestLost);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_response_without_session_is_still_malformed() {
    let validator = RecordingValidator::new(true);
    let h = harness(validator.clone(), Arc::new(DirectoryResolver));

    let err = h
        .client
        .authenticate(&callback(Some("garbage"), "SESSION=none"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthenticationError::MalformedCredentials(_)));
    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_response_is_reported() {
    let h = harness(RecordingValidator::new(true), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(Some("3!200!truncated"), "SESSION=s1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthenticationError::MalformedCredentials(_)));
    assert_eq!(err.public_message(), "Authentication failed.");
}

#[tokio::test]
async fn unknown_principal_is_not_found() {
    let h = harness(RecordingValidator::new(true), Arc::new(DirectoryResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(Some(&wls_token("200", "zz999", RETURN_URL)), "SESSION=s1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AuthenticationError::PrincipalNotFound {
            principal: "zz999".to_owned()
        }
    );
}

#[tokio::test]
async fn unauthenticated_resolver_result_is_contract_violation() {
    let h = harness(RecordingValidator::new(true), Arc::new(BrokenResolver));
    assert!(h.cache.save(&original_request(), original_request()));

    let err = h
        .client
        .authenticate(&callback(Some(&wls_token("200", "hwtb2", RETURN_URL)), "SESSION=s1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthenticationError::ResolverContractViolation(_)
    ));
    assert!(err.is_server_fault());
}

#[tokio::test]
async fn invalid_dynamic_version_fails_challenge_reconstruction() {
    let challenges = Arc::new(
        ChallengeCreator::builder(RETURN_URL)
            .unwrap()
            .with_dynamic_value(ChallengeParameter::Version, |_, _| Ok("3".into()))
            .build()
            .unwrap(),
    );
    let cache = Arc::new(InMemoryRequestCache::new("SESSION"));
    assert!(cache.save(&original_request(), original_request()));
    let collaborators = Collaborators::new(
        Arc::new(WlsResponseParser::new()),
        RecordingValidator::new(true),
        cache,
        Arc::new(DirectoryResolver),
    );
    let svc = Service::new(
        "WLS-Response",
        Arc::new(AnyRequestMatcher),
        challenges.clone(),
        collaborators,
    );
    let client = WebauthLocalClient::new(
        Arc::new(svc),
        EntryPoint::new("https://wls.example.org/".parse().unwrap(), challenges),
    );

    let err = client
        .authenticate(&callback(Some(&wls_token("200", "hwtb2", RETURN_URL)), "SESSION=s1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthenticationError::ChallengeReconstructionFailed(
            ChallengeError::ProducerInvariantViolation {
                parameter: ChallengeParameter::Version,
                ..
            }
        )
    ));
    assert!(matches!(
        client.login_redirect(&original_request()).unwrap_err(),
        ChallengeError::ProducerInvariantViolation { .. }
    ));
}

#[tokio::test]
async fn login_redirect_targets_raven_with_request_url() {
    let h = harness(RecordingValidator::new(true), Arc::new(DirectoryResolver));

    let url = h.client.login_redirect(&original_request()).unwrap();

    assert_eq!(
        url.as_str(),
        "https://raven.cam.ac.uk/auth/authenticate.html?ver=3&url=https%3A%2F%2Fapp.example.com%2Fprivate%3Fpage%3D2"
    );
}
