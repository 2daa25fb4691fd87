//! Local (in-process) client for the webauth module.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;
use webauth_sdk::{
    AuthenticationError, ChallengeError, CredentialToken, RequestDescriptor, WebauthClient,
};

use super::{EntryPoint, Service};

/// Local client wrapping the handshake service and the login entry point.
pub struct WebauthLocalClient {
    svc: Arc<Service>,
    entry_point: EntryPoint,
}

impl WebauthLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>, entry_point: EntryPoint) -> Self {
        Self { svc, entry_point }
    }
}

fn log_authentication_error(err: &AuthenticationError) {
    match err {
        AuthenticationError::MissingCredentials { parameter } => {
            tracing::debug!(parameter = %parameter, "no WLS response on request");
        }
        AuthenticationError::OriginalRequestLost => {
            tracing::info!("original request not cached, login must restart");
        }
        AuthenticationError::BadStatusCredentials { status, source } => {
            tracing::info!(status = *status, reason = %source, "WLS reported unsuccessful login");
        }
        AuthenticationError::PrincipalNotFound { principal } => {
            tracing::info!(principal = %principal, "no identity for principal");
        }
        AuthenticationError::MalformedCredentials(e) => {
            tracing::warn!(error = %e, "malformed WLS response");
        }
        AuthenticationError::ValidationFailed(e) => {
            tracing::warn!(error = %e, "WLS response failed validation");
        }
        AuthenticationError::ResolverContractViolation(msg) => {
            tracing::error!("principal resolver contract violation: {msg}");
        }
        AuthenticationError::ChallengeReconstructionFailed(e) => {
            tracing::error!(
                parameter = %e.parameter(),
                error = %e,
                "challenge reconstruction failed"
            );
        }
        AuthenticationError::Internal(msg) => tracing::error!("webauth internal error: {msg}"),
    }
}

#[async_trait]
impl WebauthClient for WebauthLocalClient {
    fn requires_authentication(&self, request: &RequestDescriptor) -> bool {
        self.svc.requires_authentication(request)
    }

    async fn authenticate(
        &self,
        request: &RequestDescriptor,
    ) -> Result<CredentialToken, AuthenticationError> {
        self.svc.authenticate(request).await.inspect_err(log_authentication_error)
    }

    fn login_redirect(&self, request: &RequestDescriptor) -> Result<Url, ChallengeError> {
        self.entry_point.redirect_url(request).inspect_err(|e| {
            tracing::error!(parameter = %e.parameter(), error = %e, "login redirect failed");
        })
    }
}
