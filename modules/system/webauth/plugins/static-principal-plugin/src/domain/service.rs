//! Service implementation for the static principal resolver plugin.

use std::collections::{BTreeSet, HashMap};

use webauth_sdk::{Authority, Principal, ResolvedPrincipal, UserIdentity};

use crate::config::{ResolutionMode, StaticPrincipalPluginConfig, UserMapping};

/// Static principal resolver service.
///
/// Maps asserted principals to identities based on configuration mode:
/// - `verbatim`: Any non-empty principal becomes a user with the default authorities
/// - `directory`: Only configured principals resolve, with their own authorities
pub struct Service {
    mode: ResolutionMode,
    default_authorities: BTreeSet<Authority>,
    users: HashMap<String, UserMapping>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticPrincipalPluginConfig) -> Self {
        let users = cfg
            .users
            .iter()
            .map(|u| (u.principal.clone(), u.clone()))
            .collect();

        tracing::info!(
            mode = ?cfg.mode,
            users = cfg.users.len(),
            "Static principal resolver configured"
        );

        Self {
            mode: cfg.mode,
            default_authorities: authorities(&cfg.default_authorities),
            users,
        }
    }

    /// Resolve an asserted principal.
    ///
    /// Returns `None` if the principal is empty or, in `directory` mode, not
    /// configured.
    #[must_use]
    pub fn resolve(&self, principal: &str) -> Option<ResolvedPrincipal> {
        if principal.is_empty() {
            return None;
        }

        match self.mode {
            ResolutionMode::Verbatim => Some(ResolvedPrincipal {
                principal: Principal::User(UserIdentity::new(principal)),
                authorities: self.default_authorities.clone(),
            }),
            ResolutionMode::Directory => {
                let user = self.users.get(principal)?;
                let mut identity = UserIdentity::new(principal);
                if let Some(display_name) = &user.display_name {
                    identity = identity.with_display_name(display_name.as_str());
                }
                Some(ResolvedPrincipal {
                    principal: Principal::User(identity),
                    authorities: authorities(&user.authorities),
                })
            }
        }
    }
}

fn authorities(names: &[String]) -> BTreeSet<Authority> {
    names.iter().map(|n| Authority::new(n.as_str())).collect()
}
