//! Challenge creation.
//!
//! A [`ChallengeCreator`] holds, for every challenge parameter it sets, either
//! a fixed value (validated when configured) or a producer computed from the
//! request that triggers the login (validated each time it runs).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use webauth_sdk::models::DEFAULT_VERSION;
use webauth_sdk::{
    ChallengeDescriptor, ChallengeError, ChallengeParameter, ParameterValue, ProducerError,
    RequestDescriptor,
};

type Producer = Arc<
    dyn Fn(ChallengeParameter, &RequestDescriptor) -> Result<ParameterValue, ProducerError>
        + Send
        + Sync,
>;

#[derive(Clone)]
enum ValueSource {
    Fixed(ParameterValue),
    Dynamic(Producer),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// Builder for [`ChallengeCreator`].
#[derive(Debug, Clone, Default)]
pub struct ChallengeCreatorBuilder {
    sources: BTreeMap<ChallengeParameter, ValueSource>,
}

impl ChallengeCreatorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed value, replacing any earlier value or producer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameterValue` if the parameter rejects the value.
    pub fn with_value(
        mut self,
        parameter: ChallengeParameter,
        value: impl Into<ParameterValue>,
    ) -> Result<Self, ChallengeError> {
        let value = value.into();
        parameter.validate(&value)?;
        self.sources.insert(parameter, ValueSource::Fixed(value));
        Ok(self)
    }

    /// Set a producer computed from the request that triggers the login.
    ///
    /// Its result is validated only when a challenge is created.
    #[must_use]
    pub fn with_dynamic_value<F>(mut self, parameter: ChallengeParameter, producer: F) -> Self
    where
        F: Fn(ChallengeParameter, &RequestDescriptor) -> Result<ParameterValue, ProducerError>
            + Send
            + Sync
            + 'static,
    {
        self.sources
            .insert(parameter, ValueSource::Dynamic(Arc::new(producer)));
        self
    }

    /// # Errors
    ///
    /// Returns `MissingRequiredParameter` for the first required parameter
    /// with neither a value nor a producer.
    pub fn build(self) -> Result<ChallengeCreator, ChallengeError> {
        if let Some(parameter) = ChallengeParameter::ALL
            .into_iter()
            .find(|p| p.is_required() && !self.sources.contains_key(p))
        {
            return Err(ChallengeError::MissingRequiredParameter { parameter });
        }
        Ok(ChallengeCreator {
            sources: self.sources,
        })
    }
}

/// Produces the challenge sent to the WLS for a given request.
///
/// Creation is deterministic as long as the producers are, which is what
/// lets the handshake regenerate the challenge after the round trip instead
/// of persisting it.
#[derive(Debug, Clone)]
pub struct ChallengeCreator {
    sources: BTreeMap<ChallengeParameter, ValueSource>,
}

impl ChallengeCreator {
    /// Builder preset with the default protocol version and a fixed return URL.
    ///
    /// # Errors
    ///
    /// Never fails for the preset values; the signature matches
    /// [`ChallengeCreatorBuilder::with_value`].
    pub fn builder(
        return_url: impl Into<String>,
    ) -> Result<ChallengeCreatorBuilder, ChallengeError> {
        Self::builder_with_version(return_url, DEFAULT_VERSION)
    }

    /// Builder preset with `version` and a fixed return URL.
    ///
    /// # Errors
    ///
    /// See [`ChallengeCreator::builder`].
    pub fn builder_with_version(
        return_url: impl Into<String>,
        version: i64,
    ) -> Result<ChallengeCreatorBuilder, ChallengeError> {
        ChallengeCreatorBuilder::new()
            .with_value(ChallengeParameter::Version, version)?
            .with_value(ChallengeParameter::ReturnUrl, return_url.into())
    }

    /// Create the challenge for `request`.
    ///
    /// # Errors
    ///
    /// - `ProducerFailed` if a producer cannot compute a value
    /// - `ProducerInvariantViolation` if a producer returns a value its own
    ///   parameter rejects
    pub fn create_challenge(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ChallengeDescriptor, ChallengeError> {
        let mut values = BTreeMap::new();
        for (&parameter, source) in &self.sources {
            let value = match source {
                ValueSource::Fixed(value) => value.clone(),
                ValueSource::Dynamic(producer) => {
                    let value = producer(parameter, request)
                        .map_err(|source| ChallengeError::ProducerFailed { parameter, source })?;
                    parameter.validate(&value).map_err(|source| {
                        ChallengeError::ProducerInvariantViolation { parameter, source }
                    })?;
                    value
                }
            };
            values.insert(parameter, value);
        }
        ChallengeDescriptor::try_new(values)
    }

    /// Parameters this creator sets, in registry order.
    #[must_use]
    pub fn parameters(&self) -> impl Iterator<Item = ChallengeParameter> + '_ {
        self.sources.keys().copied()
    }
}

/// Producer deriving the return URL from the request's absolute URL.
///
/// Relative request URIs are completed from the `Host` header and
/// `default_scheme`.
#[must_use]
pub fn request_url_producer(
    default_scheme: impl Into<String>,
) -> impl Fn(ChallengeParameter, &RequestDescriptor) -> Result<ParameterValue, ProducerError>
+ Send
+ Sync
+ 'static {
    let default_scheme = default_scheme.into();
    move |_: ChallengeParameter, request: &RequestDescriptor| {
        request
            .absolute_url(&default_scheme)
            .map(ParameterValue::Text)
            .ok_or_else(|| ProducerError::new("request URL has no host"))
    }
}
