//! Webauth SDK
//!
//! This crate provides the public surface of the `webauth` module, the
//! relying-party side of a redirect-based single-sign-on handshake with a web
//! login service (WLS):
//!
//! - [`WebauthClient`] - Public API trait for request pipelines
//! - [`ResponseParser`], [`ResponseValidator`], [`RequestCache`], [`Clock`] -
//!   Collaborators the handshake delegates to
//! - [`PrincipalResolver`] - Plugin API trait for principal resolution
//! - [`CredentialToken`] - The handshake's credential lifecycle
//! - [`ChallengeParameter`] / [`ChallengeDescriptor`] - Outbound challenge
//! - [`AuthenticationError`] and friends - Error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use webauth_sdk::{RequestDescriptor, WebauthClient};
//!
//! let request = RequestDescriptor::from_request(&http_request);
//! if client.requires_authentication(&request) {
//!     let token = client.authenticate(&request).await?;
//!     let token = token.erase_credentials();
//! } else {
//!     let location = client.login_redirect(&request)?;
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;

pub use api::{
    Clock, FixedClock, RequestCache, ResponseParser, ResponseValidator, SystemClock, WebauthClient,
    epoch_millis,
};
pub use error::{
    AuthenticationError, ChallengeError, InvalidParameterValue, ParseError, ProducerError,
    ResolverError, TokenError, ValidationError,
};
pub use models::{
    Authority, ChallengeDescriptor, ChallengeParameter, CredentialToken, Credentials,
    ParameterValue, Principal, RequestDescriptor, ResponseDescriptor, STATUS_SUCCESS,
    UserIdentity,
};
pub use plugin_api::{PrincipalResolver, ResolvedPrincipal};
