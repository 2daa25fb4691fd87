//! Client implementation for the static principal resolver plugin.
//!
//! Implements `PrincipalResolver` using the domain service.

use async_trait::async_trait;
use webauth_sdk::{CredentialToken, PrincipalResolver, ResolvedPrincipal, ResolverError};

use super::service::Service;

#[async_trait]
impl PrincipalResolver for Service {
    async fn resolve(&self, token: &CredentialToken) -> Result<ResolvedPrincipal, ResolverError> {
        if token.is_authenticated() {
            return Err(ResolverError::AlreadyAuthenticated);
        }
        let principal = token.principal().name();
        self.resolve(principal)
            .ok_or_else(|| ResolverError::PrincipalNotFound {
                principal: principal.to_owned(),
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeMap;

    use time::OffsetDateTime;
    use webauth_sdk::{
        Authority, ChallengeDescriptor, ChallengeParameter, ParameterValue, ResponseDescriptor,
    };

    use super::*;
    use crate::config::{ResolutionMode, StaticPrincipalPluginConfig};

    fn token(principal: &str) -> CredentialToken {
        let values: BTreeMap<ChallengeParameter, ParameterValue> = [
            (ChallengeParameter::Version, 3.into()),
            (ChallengeParameter::ReturnUrl, "https://app.example.com/".into()),
        ]
        .into_iter()
        .collect();
        CredentialToken::unauthenticated(
            ChallengeDescriptor::try_new(values).unwrap(),
            ResponseDescriptor::builder().principal(principal).build(),
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn plugin_trait_verbatim_authenticates() {
        let service = Service::from_config(&StaticPrincipalPluginConfig::default());
        let plugin: &dyn PrincipalResolver = &service;

        let authed = plugin
            .create_authenticated_token(&token("abc123"))
            .await
            .unwrap();

        assert!(authed.is_authenticated());
        assert_eq!(authed.principal().name(), "abc123");
        assert!(authed.authorities().contains(&Authority::new("ROLE_USER")));
    }

    #[tokio::test]
    async fn plugin_trait_unknown_principal_not_found() {
        let cfg = StaticPrincipalPluginConfig {
            mode: ResolutionMode::Directory,
            ..StaticPrincipalPluginConfig::default()
        };
        let service = Service::from_config(&cfg);
        let plugin: &dyn PrincipalResolver = &service;

        let err = plugin
            .create_authenticated_token(&token("abc123"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolverError::PrincipalNotFound {
                principal: "abc123".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn plugin_trait_rejects_authenticated_token() {
        let service = Service::from_config(&StaticPrincipalPluginConfig::default());
        let plugin: &dyn PrincipalResolver = &service;
        let authed = plugin
            .create_authenticated_token(&token("abc123"))
            .await
            .unwrap();

        let err = plugin.resolve(&authed).await.unwrap_err();
        assert_eq!(err, ResolverError::AlreadyAuthenticated);
    }
}
