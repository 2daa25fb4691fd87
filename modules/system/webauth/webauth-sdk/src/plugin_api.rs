//! Plugin API trait for principal resolution.
//!
//! After the WLS response has been validated, a resolver maps the asserted
//! principal to application identity data and authorities.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::ResolverError;
use crate::models::{Authority, CredentialToken, Principal};

/// Identity and capabilities resolved for a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrincipal {
    pub principal: Principal,
    pub authorities: BTreeSet<Authority>,
}

/// Plugin API trait for principal resolver implementations.
///
/// Implementations range from trusting the raw principal verbatim to looking
/// the user up in a directory.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolve the principal of a validated, unauthenticated token.
    ///
    /// # Errors
    ///
    /// - `AlreadyAuthenticated` if `token` is already authenticated
    /// - `PrincipalNotFound` if no identity matches the principal
    /// - `Internal` for lookup failures
    async fn resolve(&self, token: &CredentialToken) -> Result<ResolvedPrincipal, ResolverError>;

    /// Produce the authenticated token handed to authorization.
    ///
    /// The result must be authenticated. The default resolves the principal
    /// and derives the token with [`CredentialToken::authenticate`].
    ///
    /// # Errors
    ///
    /// Same as [`PrincipalResolver::resolve`].
    async fn create_authenticated_token(
        &self,
        token: &CredentialToken,
    ) -> Result<CredentialToken, ResolverError> {
        if token.is_authenticated() {
            return Err(ResolverError::AlreadyAuthenticated);
        }
        let resolved = self.resolve(token).await?;
        Ok(token.authenticate(resolved.principal, resolved.authorities)?)
    }
}
