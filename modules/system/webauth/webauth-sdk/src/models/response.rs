//! Parsed WLS response.

use secrecy::SecretString;
use time::OffsetDateTime;

/// Status code the WLS uses for a successful authentication.
pub const STATUS_SUCCESS: u16 = 200;

/// Human-readable reason for a known WLS status code.
#[must_use]
pub fn describe_status(status: u16) -> Option<&'static str> {
    let reason = match status {
        200 => "successful authentication",
        410 => "the user cancelled the authentication request",
        510 => "no mutually acceptable authentication types available",
        520 => "unsupported protocol version",
        530 => "general request parameter error",
        540 => "interaction would be required",
        560 => "the application is not authorised to use the login service",
        570 => "the login service declined to authenticate the user",
        _ => return None,
    };
    Some(reason)
}

/// Structured form of the signed response token returned by the WLS.
///
/// Immutable once built. The raw token and its signature are kept as secrets
/// so they never show up in `Debug` output.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    version: u32,
    status: u16,
    message: Option<String>,
    issue: OffsetDateTime,
    id: String,
    url: String,
    principal: String,
    ptags: Vec<String>,
    auth: Option<String>,
    sso: Vec<String>,
    life: Option<u64>,
    params: Option<String>,
    kid: Option<String>,
    signature: Option<SecretString>,
    raw_token: Option<SecretString>,
}

impl ResponseDescriptor {
    #[must_use]
    pub fn builder() -> ResponseDescriptorBuilder {
        ResponseDescriptorBuilder::default()
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Optional text accompanying the status.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// When the WLS issued the response.
    #[must_use]
    pub fn issue(&self) -> OffsetDateTime {
        self.issue
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The return URL the WLS believes it was given.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Asserted identity. Empty unless the status is a success.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    #[must_use]
    pub fn ptags(&self) -> &[String] {
        &self.ptags
    }

    /// Authentication type used for this login, if the user interacted.
    #[must_use]
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// Authentication types of earlier logins reused for this one.
    #[must_use]
    pub fn sso(&self) -> &[String] {
        &self.sso
    }

    /// Remaining session lifetime at the WLS, in seconds.
    #[must_use]
    pub fn life(&self) -> Option<u64> {
        self.life
    }

    /// The `params` value echoed from the challenge.
    #[must_use]
    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    #[must_use]
    pub fn signature(&self) -> Option<&SecretString> {
        self.signature.as_ref()
    }

    /// The token string this descriptor was parsed from.
    #[must_use]
    pub fn raw_token(&self) -> Option<&SecretString> {
        self.raw_token.as_ref()
    }
}

/// Builder for [`ResponseDescriptor`], used by parsers and tests.
#[derive(Default)]
pub struct ResponseDescriptorBuilder {
    version: Option<u32>,
    status: Option<u16>,
    message: Option<String>,
    issue: Option<OffsetDateTime>,
    id: String,
    url: String,
    principal: String,
    ptags: Vec<String>,
    auth: Option<String>,
    sso: Vec<String>,
    life: Option<u64>,
    params: Option<String>,
    kid: Option<String>,
    signature: Option<SecretString>,
    raw_token: Option<SecretString>,
}

impl ResponseDescriptorBuilder {
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn issue(mut self, issue: OffsetDateTime) -> Self {
        self.issue = Some(issue);
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }

    #[must_use]
    pub fn ptags(mut self, ptags: Vec<String>) -> Self {
        self.ptags = ptags;
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    #[must_use]
    pub fn sso(mut self, sso: Vec<String>) -> Self {
        self.sso = sso;
        self
    }

    #[must_use]
    pub fn life(mut self, life: u64) -> Self {
        self.life = Some(life);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    #[must_use]
    pub fn kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    #[must_use]
    pub fn signature(mut self, signature: impl Into<SecretString>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    #[must_use]
    pub fn raw_token(mut self, raw_token: impl Into<SecretString>) -> Self {
        self.raw_token = Some(raw_token.into());
        self
    }

    /// Unset version defaults to 3, status to success, issue to the Unix epoch.
    #[must_use]
    pub fn build(self) -> ResponseDescriptor {
        ResponseDescriptor {
            version: self.version.unwrap_or(3),
            status: self.status.unwrap_or(STATUS_SUCCESS),
            message: self.message,
            issue: self.issue.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            id: self.id,
            url: self.url,
            principal: self.principal,
            ptags: self.ptags,
            auth: self.auth,
            sso: self.sso,
            life: self.life,
            params: self.params,
            kid: self.kid,
            signature: self.signature,
            raw_token: self.raw_token,
        }
    }
}
