//! Configuration for the static principal resolver plugin.

use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticPrincipalPluginConfig {
    /// Resolution mode.
    pub mode: ResolutionMode,

    /// Authorities granted in `verbatim` mode.
    pub default_authorities: Vec<String>,

    /// Known users for `directory` mode.
    pub users: Vec<UserMapping>,
}

impl Default for StaticPrincipalPluginConfig {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::Verbatim,
            default_authorities: vec!["ROLE_USER".to_owned()],
            users: Vec::new(),
        }
    }
}

/// Resolution mode.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Trust the asserted principal and grant the default authorities.
    #[default]
    Verbatim,
    /// Resolve only principals listed in `users`.
    Directory,
}

/// A user known to `directory` mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserMapping {
    /// The principal string the WLS asserts for this user.
    pub principal: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
}
