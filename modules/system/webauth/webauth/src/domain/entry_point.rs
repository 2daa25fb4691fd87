//! Login redirect for visitors without a valid credential.

use std::sync::Arc;

use url::Url;
use webauth_sdk::{ChallengeError, RequestDescriptor};

use super::challenge::ChallengeCreator;

/// Sends unauthenticated visitors to the WLS with a challenge for the page
/// they asked for.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    login_url: Url,
    challenges: Arc<ChallengeCreator>,
}

impl EntryPoint {
    #[must_use]
    pub fn new(login_url: Url, challenges: Arc<ChallengeCreator>) -> Self {
        Self {
            login_url,
            challenges,
        }
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// The WLS URL with its query replaced by the challenge for `request`.
    ///
    /// # Errors
    ///
    /// Propagates the [`ChallengeError`] from challenge creation.
    #[tracing::instrument(skip_all, fields(path = %request.uri().path()))]
    pub fn redirect_url(&self, request: &RequestDescriptor) -> Result<Url, ChallengeError> {
        let challenge = self.challenges.create_challenge(request)?;
        let url = challenge.redirect_url(&self.login_url);
        tracing::debug!(login_url = %self.login_url, "redirecting to web login service");
        Ok(url)
    }
}
