//! Public API and collaborator traits for the webauth module.
//!
//! [`WebauthClient`] is what a request pipeline consumes. The remaining traits
//! are the capabilities the handshake delegates to and that the host supplies:
//! decoding the signed token, checking it cryptographically, remembering the
//! request that triggered the redirect, and telling the time.

use async_trait::async_trait;
use time::OffsetDateTime;
use url::Url;

use crate::error::{AuthenticationError, ChallengeError, ParseError, ValidationError};
use crate::models::{ChallengeDescriptor, CredentialToken, RequestDescriptor, ResponseDescriptor};

/// Public API trait for the webauth module.
///
/// ```ignore
/// if client.requires_authentication(&request) {
///     let token = client.authenticate(&request).await?;
/// }
/// ```
#[async_trait]
pub trait WebauthClient: Send + Sync {
    /// Whether the request is a redirect back from the WLS that should be
    /// intercepted. Pure predicate, safe to call for every request.
    fn requires_authentication(&self, request: &RequestDescriptor) -> bool;

    /// Run the handshake for an intercepted request.
    ///
    /// # Errors
    ///
    /// Any variant of [`AuthenticationError`]; every failure is terminal for
    /// this attempt.
    async fn authenticate(
        &self,
        request: &RequestDescriptor,
    ) -> Result<CredentialToken, AuthenticationError>;

    /// URL to redirect an unauthenticated visitor to.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError`] if the challenge cannot be created for the request.
    fn login_redirect(&self, request: &RequestDescriptor) -> Result<Url, ChallengeError>;
}

/// Decodes the signed token string into its fields.
pub trait ResponseParser: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ParseError`] when the token is not well formed.
    fn parse(&self, token: &str) -> Result<ResponseDescriptor, ParseError>;
}

/// Checks a response's authenticity and freshness against the challenge.
///
/// Replay protection (unique id, issue time) is the validator's job.
#[async_trait]
pub trait ResponseValidator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ValidationError`] with the reason the response was rejected.
    async fn validate(
        &self,
        challenge: &ChallengeDescriptor,
        response: &ResponseDescriptor,
        received_at_epoch_millis: i64,
    ) -> Result<(), ValidationError>;
}

/// Remembers the request a visitor was making before being sent to the WLS.
///
/// Reads are non-destructive: the entry stays available for whoever redirects
/// the visitor back to it after a successful login.
#[async_trait]
pub trait RequestCache: Send + Sync {
    async fn get(&self, current: &RequestDescriptor) -> Option<RequestDescriptor>;
}

/// Time source for response receipt timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn epoch_millis(instant: OffsetDateTime) -> i64 {
    instant.unix_timestamp() * 1000 + i64::from(instant.millisecond())
}
