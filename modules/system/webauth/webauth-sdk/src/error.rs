//! Error types for the webauth module.
//!
//! The taxonomy is split by the stage that can fail: challenge construction,
//! token state transitions, response parsing, response validation, principal
//! resolution and, wrapping all of them, the handshake itself.

use thiserror::Error;

use crate::models::{ChallengeParameter, describe_status};

/// A value was rejected by its challenge parameter's validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for challenge parameter '{parameter}': {reason}")]
pub struct InvalidParameterValue {
    pub parameter: ChallengeParameter,
    pub reason: String,
}

impl InvalidParameterValue {
    #[must_use]
    pub fn new(parameter: ChallengeParameter, reason: impl Into<String>) -> Self {
        Self {
            parameter,
            reason: reason.into(),
        }
    }
}

/// A dynamic value producer could not compute a value for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProducerError(pub String);

impl ProducerError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised while configuring or creating a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// A fixed value was rejected by its parameter's validator.
    #[error(transparent)]
    InvalidParameterValue(#[from] InvalidParameterValue),

    /// A required parameter has no value or producer.
    #[error("required challenge parameter '{parameter}' has no value")]
    MissingRequiredParameter { parameter: ChallengeParameter },

    /// A dynamic producer failed against the request it was given.
    #[error("producer for challenge parameter '{parameter}' failed: {source}")]
    ProducerFailed {
        parameter: ChallengeParameter,
        #[source]
        source: ProducerError,
    },

    /// A dynamic producer returned a value its own parameter rejects.
    ///
    /// This is a defect in the producer rather than in caller input.
    #[error("producer for challenge parameter '{parameter}' broke its contract: {source}")]
    ProducerInvariantViolation {
        parameter: ChallengeParameter,
        #[source]
        source: InvalidParameterValue,
    },
}

impl ChallengeError {
    /// The parameter the error refers to.
    #[must_use]
    pub fn parameter(&self) -> ChallengeParameter {
        match self {
            Self::InvalidParameterValue(e) => e.parameter,
            Self::MissingRequiredParameter { parameter }
            | Self::ProducerFailed { parameter, .. }
            | Self::ProducerInvariantViolation { parameter, .. } => *parameter,
        }
    }
}

/// Illegal credential token state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("credential token is already authenticated")]
    AlreadyAuthenticated,

    #[error("challenge, response and receipt time must be all present or all absent")]
    PartialCredentials,
}

/// The signed response token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response token is empty")]
    Empty,

    #[error("unsupported response version '{0}'")]
    UnsupportedVersion(String),

    #[error("expected {expected} response fields for version {version}, got {actual}")]
    FieldCount {
        version: u32,
        expected: usize,
        actual: usize,
    },

    #[error("invalid response field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// The external validator rejected a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors returned by a [`crate::PrincipalResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// The resolver was handed a token that is already authenticated.
    #[error("principal resolver invoked with an already authenticated token")]
    AlreadyAuthenticated,

    /// No identity matches the asserted principal.
    #[error("no identity found for principal '{principal}'")]
    PrincipalNotFound { principal: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Terminal outcome of a rejected handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    /// The inbound request did not carry the response parameter.
    #[error("request contained no query parameter named '{parameter}'")]
    MissingCredentials { parameter: String },

    /// The response parameter did not parse.
    #[error("malformed response token: {0}")]
    MalformedCredentials(#[source] ParseError),

    /// The request that started the handshake is no longer cached.
    #[error("original request not found in request cache")]
    OriginalRequestLost,

    /// The challenge could not be regenerated for the original request.
    #[error("failed to reconstruct challenge: {0}")]
    ChallengeReconstructionFailed(#[source] ChallengeError),

    /// The WLS reported a non-success status.
    #[error("response contained unsuccessful status: {status}")]
    BadStatusCredentials {
        status: u16,
        #[source]
        source: ValidationError,
    },

    /// Signature, freshness or correlation checks failed.
    #[error("response did not validate: {0}")]
    ValidationFailed(#[source] ValidationError),

    /// The principal resolver returned an unauthenticated result.
    #[error("principal resolver contract violation: {0}")]
    ResolverContractViolation(String),

    /// The principal resolver found no identity.
    #[error("no identity found for principal '{principal}'")]
    PrincipalNotFound { principal: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthenticationError {
    /// Whether the failure points at a broken deployment rather than at the
    /// visitor's login attempt.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::ResolverContractViolation(_)
                | Self::ChallengeReconstructionFailed(_)
                | Self::Internal(_)
        )
    }

    /// Message that is safe to show to the end user.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingCredentials { .. } => {
                "You are not logged in. Please try logging in again.".to_owned()
            }
            Self::OriginalRequestLost => {
                "Your session expired during login. Please restart login.".to_owned()
            }
            Self::BadStatusCredentials { status, .. } => match describe_status(*status) {
                Some(reason) => format!("Login was not completed: {reason}."),
                None => "Login was not completed.".to_owned(),
            },
            Self::PrincipalNotFound { .. } => {
                "Your account is not permitted to use this application.".to_owned()
            }
            Self::MalformedCredentials(_) | Self::ValidationFailed(_) => {
                "Authentication failed.".to_owned()
            }
            Self::ChallengeReconstructionFailed(_)
            | Self::ResolverContractViolation(_)
            | Self::Internal(_) => "Internal authentication error.".to_owned(),
        }
    }
}

impl From<ResolverError> for AuthenticationError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::PrincipalNotFound { principal } => Self::PrincipalNotFound { principal },
            ResolverError::AlreadyAuthenticated | ResolverError::Token(_) => {
                Self::ResolverContractViolation(e.to_string())
            }
            ResolverError::Internal(msg) => Self::Internal(msg),
        }
    }
}
