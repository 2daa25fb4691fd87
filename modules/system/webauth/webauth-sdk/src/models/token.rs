//! Credential token: one handshake attempt from receipt to authentication.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::challenge::ChallengeDescriptor;
use super::response::ResponseDescriptor;
use crate::error::TokenError;

/// A capability granted to an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity data resolved for a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserIdentity {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Who a token speaks for.
///
/// `Raw` holds the principal string asserted by the WLS and is what an
/// unauthenticated token carries; `User` is what a resolver produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    Raw { name: String },
    User(UserIdentity),
}

impl Principal {
    #[must_use]
    pub fn raw(name: impl Into<String>) -> Self {
        Self::Raw { name: name.into() }
    }

    /// Login name, whichever form the principal is in.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Raw { name } => name,
            Self::User(identity) => &identity.username,
        }
    }
}

/// The raw material of a handshake: what was asked, what came back, and when.
#[derive(Debug, Clone)]
pub struct Credentials {
    challenge: ChallengeDescriptor,
    response: ResponseDescriptor,
    received_at: OffsetDateTime,
}

impl Credentials {
    #[must_use]
    pub fn new(
        challenge: ChallengeDescriptor,
        response: ResponseDescriptor,
        received_at: OffsetDateTime,
    ) -> Self {
        Self {
            challenge,
            response,
            received_at,
        }
    }

    /// Rebuild credentials from independently stored parts.
    ///
    /// # Errors
    ///
    /// Returns `PartialCredentials` unless all three parts are present or all
    /// three are absent.
    pub fn try_from_parts(
        challenge: Option<ChallengeDescriptor>,
        response: Option<ResponseDescriptor>,
        received_at: Option<OffsetDateTime>,
    ) -> Result<Option<Self>, TokenError> {
        match (challenge, response, received_at) {
            (Some(challenge), Some(response), Some(received_at)) => {
                Ok(Some(Self::new(challenge, response, received_at)))
            }
            (None, None, None) => Ok(None),
            _ => Err(TokenError::PartialCredentials),
        }
    }

    #[must_use]
    pub fn challenge(&self) -> &ChallengeDescriptor {
        &self.challenge
    }

    #[must_use]
    pub fn response(&self) -> &ResponseDescriptor {
        &self.response
    }

    #[must_use]
    pub fn received_at(&self) -> OffsetDateTime {
        self.received_at
    }
}

/// Whether a token still holds its raw credentials.
#[derive(Debug, Clone)]
pub enum TokenCredentials {
    Present(Box<Credentials>),
    Erased,
}

/// The entity representing a single handshake attempt.
///
/// Tokens are immutable values: authentication derives a new token and
/// erasure consumes the old one. The authenticated flag only ever moves from
/// `false` to `true`, and only through [`CredentialToken::authenticate`].
#[derive(Debug, Clone)]
pub struct CredentialToken {
    credentials: TokenCredentials,
    principal: Principal,
    authorities: BTreeSet<Authority>,
    authenticated: bool,
}

impl CredentialToken {
    /// Token for a freshly received response, before any validation.
    ///
    /// The principal is the raw principal field of the response.
    #[must_use]
    pub fn unauthenticated(
        challenge: ChallengeDescriptor,
        response: ResponseDescriptor,
        received_at: OffsetDateTime,
    ) -> Self {
        let principal = Principal::raw(response.principal());
        Self {
            credentials: TokenCredentials::Present(Box::new(Credentials::new(
                challenge,
                response,
                received_at,
            ))),
            principal,
            authorities: BTreeSet::new(),
            authenticated: false,
        }
    }

    /// Restore a token from stored parts, e.g. out of session storage.
    ///
    /// The restored token is always unauthenticated; pass it through
    /// [`CredentialToken::authenticate`] to set the flag.
    ///
    /// # Errors
    ///
    /// Returns `PartialCredentials` when only some of challenge, response and
    /// receipt time are supplied.
    pub fn from_parts(
        challenge: Option<ChallengeDescriptor>,
        response: Option<ResponseDescriptor>,
        received_at: Option<OffsetDateTime>,
        principal: Principal,
        authorities: BTreeSet<Authority>,
    ) -> Result<Self, TokenError> {
        let credentials = match Credentials::try_from_parts(challenge, response, received_at)? {
            Some(credentials) => TokenCredentials::Present(Box::new(credentials)),
            None => TokenCredentials::Erased,
        };
        Ok(Self {
            credentials,
            principal,
            authorities,
            authenticated: false,
        })
    }

    /// Derive the authenticated counterpart of this token.
    ///
    /// Credentials are carried over unchanged; principal and authorities are
    /// replaced by the supplied ones.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAuthenticated` if this token is already authenticated.
    pub fn authenticate(
        &self,
        principal: Principal,
        authorities: BTreeSet<Authority>,
    ) -> Result<Self, TokenError> {
        if self.authenticated {
            return Err(TokenError::AlreadyAuthenticated);
        }
        Ok(Self {
            credentials: self.credentials.clone(),
            principal,
            authorities,
            authenticated: true,
        })
    }

    /// Drop challenge, response and receipt time, keeping principal,
    /// authorities and the authenticated flag.
    #[must_use]
    pub fn erase_credentials(self) -> Self {
        Self {
            credentials: TokenCredentials::Erased,
            ..self
        }
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.credentials {
            TokenCredentials::Present(credentials) => Some(&**credentials),
            TokenCredentials::Erased => None,
        }
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        matches!(self.credentials, TokenCredentials::Present(_))
    }

    #[must_use]
    pub fn challenge(&self) -> Option<&ChallengeDescriptor> {
        self.credentials().map(Credentials::challenge)
    }

    #[must_use]
    pub fn response(&self) -> Option<&ResponseDescriptor> {
        self.credentials().map(Credentials::response)
    }

    #[must_use]
    pub fn received_at(&self) -> Option<OffsetDateTime> {
        self.credentials().map(Credentials::received_at)
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn authorities(&self) -> &BTreeSet<Authority> {
        &self.authorities
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
