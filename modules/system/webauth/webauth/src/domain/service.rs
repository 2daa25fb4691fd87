//! Handshake orchestration.
//!
//! One call to [`Service::authenticate`] drives a single handshake attempt
//! from the inbound WLS redirect to an authenticated [`CredentialToken`] or a
//! terminal [`AuthenticationError`]. The service holds no per-attempt state,
//! so concurrent attempts need no locking.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use webauth_sdk::{
    AuthenticationError, Clock, CredentialToken, PrincipalResolver, RequestCache,
    RequestDescriptor, ResponseParser, ResponseValidator, SystemClock, epoch_millis,
};

use super::challenge::ChallengeCreator;
use super::matcher::{RequestMatcher, ResponseParameterMatcher};

/// Stage of a single handshake attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitingResponse,
    ResponseReceived,
    Validating,
    Authenticated,
    Rejected,
}

impl HandshakeState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingResponse => "awaiting_response",
            Self::ResponseReceived => "response_received",
            Self::Validating => "validating",
            Self::Authenticated => "authenticated",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(state: HandshakeState) {
    tracing::Span::current().record("state", state.as_str());
    tracing::debug!(state = %state, "handshake state changed");
}

/// Capabilities the handshake delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub parser: Arc<dyn ResponseParser>,
    pub validator: Arc<dyn ResponseValidator>,
    pub request_cache: Arc<dyn RequestCache>,
    pub resolver: Arc<dyn PrincipalResolver>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Collaborators using the system clock.
    #[must_use]
    pub fn new(
        parser: Arc<dyn ResponseParser>,
        validator: Arc<dyn ResponseValidator>,
        request_cache: Arc<dyn RequestCache>,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            parser,
            validator,
            request_cache,
            resolver,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Webauth handshake service.
pub struct Service {
    response_matcher: ResponseParameterMatcher,
    host_matcher: Arc<dyn RequestMatcher>,
    challenges: Arc<ChallengeCreator>,
    collaborators: Collaborators,
}

impl Service {
    #[must_use]
    pub fn new(
        response_parameter: impl Into<String>,
        host_matcher: Arc<dyn RequestMatcher>,
        challenges: Arc<ChallengeCreator>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            response_matcher: ResponseParameterMatcher::new(response_parameter),
            host_matcher,
            challenges,
            collaborators,
        }
    }

    #[must_use]
    pub fn response_parameter(&self) -> &str {
        self.response_matcher.parameter()
    }

    /// Whether the host wants this request authenticated and it carries a
    /// WLS response.
    #[must_use]
    pub fn requires_authentication(&self, request: &RequestDescriptor) -> bool {
        self.host_matcher.matches(request) && self.response_matcher.matches(request)
    }

    /// Run one handshake attempt for an inbound WLS redirect.
    ///
    /// The clock is read exactly once; that instant is the token's receipt
    /// time and the value handed to the validator.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` if the response parameter is absent
    /// - `MalformedCredentials` if the response does not parse
    /// - `OriginalRequestLost` if the request cache has no entry
    /// - `ChallengeReconstructionFailed` if the challenge cannot be recreated
    /// - `BadStatusCredentials` / `ValidationFailed` if the validator rejects
    /// - `PrincipalNotFound` / `ResolverContractViolation` / `Internal` from
    ///   principal resolution
    #[tracing::instrument(
        skip_all,
        fields(path = %request.uri().path(), state = tracing::field::Empty)
    )]
    pub async fn authenticate(
        &self,
        request: &RequestDescriptor,
    ) -> Result<CredentialToken, AuthenticationError> {
        let received_at = self.collaborators.clock.now();
        enter(HandshakeState::AwaitingResponse);

        let result = self.run_handshake(request, received_at).await;
        match &result {
            Ok(token) => {
                enter(HandshakeState::Authenticated);
                tracing::info!(principal = %token.principal().name(), "handshake completed");
            }
            Err(_) => enter(HandshakeState::Rejected),
        }
        result
    }

    async fn run_handshake(
        &self,
        request: &RequestDescriptor,
        received_at: OffsetDateTime,
    ) -> Result<CredentialToken, AuthenticationError> {
        let raw = request.query_param(self.response_parameter()).ok_or_else(|| {
            AuthenticationError::MissingCredentials {
                parameter: self.response_parameter().to_owned(),
            }
        })?;

        let response = self
            .collaborators
            .parser
            .parse(&raw)
            .map_err(AuthenticationError::MalformedCredentials)?;

        let original = self
            .collaborators
            .request_cache
            .get(request)
            .await
            .ok_or(AuthenticationError::OriginalRequestLost)?;

        let challenge = self
            .challenges
            .create_challenge(&original)
            .map_err(AuthenticationError::ChallengeReconstructionFailed)?;

        let token = CredentialToken::unauthenticated(challenge, response, received_at);
        enter(HandshakeState::ResponseReceived);

        let credentials = token.credentials().ok_or_else(|| {
            AuthenticationError::Internal("fresh token carries no credentials".to_owned())
        })?;
        enter(HandshakeState::Validating);
        if let Err(e) = self
            .collaborators
            .validator
            .validate(
                credentials.challenge(),
                credentials.response(),
                epoch_millis(received_at),
            )
            .await
        {
            let response = credentials.response();
            return Err(if response.is_success() {
                AuthenticationError::ValidationFailed(e)
            } else {
                AuthenticationError::BadStatusCredentials {
                    status: response.status(),
                    source: e,
                }
            });
        }

        let authenticated = self
            .collaborators
            .resolver
            .create_authenticated_token(&token)
            .await?;
        if !authenticated.is_authenticated() {
            return Err(AuthenticationError::ResolverContractViolation(
                "principal resolver returned an unauthenticated token".to_owned(),
            ));
        }
        Ok(authenticated)
    }
}
