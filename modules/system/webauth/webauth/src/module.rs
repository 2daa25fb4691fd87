//! Webauth module wiring.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use url::Url;
use webauth_sdk::{
    ChallengeError, ChallengeParameter, PrincipalResolver, ResponseValidator, WebauthClient,
};

use crate::config::{ChallengeConfig, WebauthConfig};
use crate::domain::{
    ChallengeCreator, ChallengeCreatorBuilder, Collaborators, EntryPoint, RequestMatcher, Service,
    WebauthLocalClient, request_url_producer,
};
use crate::infra::{InMemoryRequestCache, WlsResponseParser};

/// Build the challenge creator described by `cfg`.
///
/// Without a configured return URL, the URL of the request that triggered
/// the login is used.
///
/// # Errors
///
/// Returns the first [`ChallengeError`] raised by a configured value.
pub fn challenge_creator(cfg: &ChallengeConfig) -> Result<ChallengeCreator, ChallengeError> {
    let mut builder =
        ChallengeCreatorBuilder::new().with_value(ChallengeParameter::Version, cfg.version)?;

    builder = match &cfg.return_url {
        Some(url) => builder.with_value(ChallengeParameter::ReturnUrl, url.as_str())?,
        None => builder.with_dynamic_value(
            ChallengeParameter::ReturnUrl,
            request_url_producer(cfg.default_scheme.as_str()),
        ),
    };

    let optional = [
        (ChallengeParameter::Description, &cfg.description),
        (ChallengeParameter::AuthTypes, &cfg.auth_types),
        (ChallengeParameter::Interactive, &cfg.interactive),
        (ChallengeParameter::Message, &cfg.message),
        (ChallengeParameter::ExtraParams, &cfg.params),
        (ChallengeParameter::FailureMode, &cfg.failure_mode),
    ];
    for (parameter, value) in optional {
        if let Some(value) = value {
            builder = builder.with_value(parameter, value.as_str())?;
        }
    }

    builder.build()
}

/// Collaborators backed by the bundled parser and in-memory request cache.
///
/// The cache is returned as well so the host can store the original request
/// before redirecting to the WLS.
#[must_use]
pub fn default_collaborators(
    cfg: &WebauthConfig,
    validator: Arc<dyn ResponseValidator>,
    resolver: Arc<dyn PrincipalResolver>,
) -> (Collaborators, Arc<InMemoryRequestCache>) {
    let cache = Arc::new(InMemoryRequestCache::new(
        cfg.request_cache.session_cookie.as_str(),
    ));
    let collaborators = Collaborators::new(
        Arc::new(WlsResponseParser::new()),
        validator,
        cache.clone(),
        resolver,
    );
    (collaborators, cache)
}

/// Wire the module from configuration.
///
/// Configuration errors surface here rather than on the first request.
///
/// # Errors
///
/// Fails if the login URL does not parse or a challenge value is rejected.
#[tracing::instrument(skip_all, fields(response_parameter = %cfg.response_parameter))]
pub fn init(
    cfg: &WebauthConfig,
    collaborators: Collaborators,
    host_matcher: Arc<dyn RequestMatcher>,
) -> anyhow::Result<Arc<dyn WebauthClient>> {
    info!(login_url = %cfg.login_url, "Initializing webauth");

    let login_url = Url::parse(&cfg.login_url)
        .with_context(|| format!("invalid login_url '{}'", cfg.login_url))?;
    let challenges = Arc::new(
        challenge_creator(&cfg.challenge).context("invalid challenge configuration")?,
    );
    info!(
        version = cfg.challenge.version,
        fixed_return_url = cfg.challenge.return_url.is_some(),
        parameters = challenges.parameters().count(),
        "Challenge creator configured"
    );

    let svc = Arc::new(Service::new(
        cfg.response_parameter.as_str(),
        host_matcher,
        challenges.clone(),
        collaborators,
    ));
    let entry_point = EntryPoint::new(login_url, challenges);

    let api: Arc<dyn WebauthClient> = Arc::new(WebauthLocalClient::new(svc, entry_point));
    Ok(api)
}
