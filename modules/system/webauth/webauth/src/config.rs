//! Configuration for the webauth module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use webauth_sdk::models::DEFAULT_VERSION;

/// Query parameter the WLS uses to carry its response.
pub const DEFAULT_RESPONSE_PARAMETER: &str = "WLS-Response";

/// Authentication page of the University of Cambridge Raven WLS.
pub const DEFAULT_LOGIN_URL: &str = "https://raven.cam.ac.uk/auth/authenticate.html";

/// Environment variable prefix; `__` separates nested keys.
pub const ENV_PREFIX: &str = "WEBAUTH__";

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebauthConfig {
    /// Name of the query parameter carrying the WLS response.
    pub response_parameter: String,

    /// WLS authentication URL visitors are redirected to.
    pub login_url: String,

    /// Static challenge values.
    pub challenge: ChallengeConfig,

    /// In-memory request cache settings.
    pub request_cache: RequestCacheConfig,
}

impl Default for WebauthConfig {
    fn default() -> Self {
        Self {
            response_parameter: DEFAULT_RESPONSE_PARAMETER.to_owned(),
            login_url: DEFAULT_LOGIN_URL.to_owned(),
            challenge: ChallengeConfig::default(),
            request_cache: RequestCacheConfig::default(),
        }
    }
}

impl WebauthConfig {
    /// Configuration sources: built-in defaults, then `path`, then the
    /// environment.
    #[must_use]
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration from a YAML file overlaid with the environment.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be read or does not match the schema.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::figment(path).extract()?)
    }
}

/// Challenge values that do not depend on the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChallengeConfig {
    /// Protocol version (`ver`).
    pub version: i64,

    /// Fixed return URL (`url`). When unset, the URL of the request that
    /// triggered the login is used.
    pub return_url: Option<String>,

    /// Scheme assumed when deriving the return URL from a relative request URI.
    pub default_scheme: String,

    pub description: Option<String>,
    pub auth_types: Option<String>,
    pub interactive: Option<String>,
    pub message: Option<String>,
    pub params: Option<String>,
    pub failure_mode: Option<String>,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            return_url: None,
            default_scheme: "https".to_owned(),
            description: None,
            auth_types: None,
            interactive: None,
            message: None,
            params: None,
            failure_mode: None,
        }
    }
}

/// Settings for the in-memory request cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestCacheConfig {
    /// Cookie whose value keys cached requests.
    pub session_cookie: String,
}

impl Default for RequestCacheConfig {
    fn default() -> Self {
        Self {
            session_cookie: "SESSION".to_owned(),
        }
    }
}
