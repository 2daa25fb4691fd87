//! Concrete outbound challenge.

use std::collections::BTreeMap;

use url::Url;

use super::params::{ChallengeParameter, ParameterValue};
use crate::error::ChallengeError;

/// A validated set of challenge parameter values.
///
/// Every required parameter is present and every value satisfies its
/// parameter's rule; the constructor refuses anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDescriptor {
    values: BTreeMap<ChallengeParameter, ParameterValue>,
}

impl ChallengeDescriptor {
    /// Build a descriptor from concrete values.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredParameter` if a required parameter is absent
    /// - `InvalidParameterValue` if a value fails its parameter's rule
    pub fn try_new(
        values: BTreeMap<ChallengeParameter, ParameterValue>,
    ) -> Result<Self, ChallengeError> {
        if let Some(parameter) = ChallengeParameter::ALL
            .into_iter()
            .find(|p| p.is_required() && !values.contains_key(p))
        {
            return Err(ChallengeError::MissingRequiredParameter { parameter });
        }

        for (parameter, value) in &values {
            parameter.validate(value)?;
        }

        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, parameter: ChallengeParameter) -> Option<&ParameterValue> {
        self.values.get(&parameter)
    }

    /// The `url` the WLS will redirect back to.
    #[must_use]
    pub fn return_url(&self) -> Option<&str> {
        self.get(ChallengeParameter::ReturnUrl)
            .and_then(ParameterValue::as_text)
    }

    #[must_use]
    pub fn version(&self) -> Option<i64> {
        self.get(ChallengeParameter::Version)
            .and_then(ParameterValue::as_integer)
    }

    /// Values in registry order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (ChallengeParameter, &ParameterValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }

    /// Canonical query string: `name=value` pairs in registry order joined by
    /// `&`, names and values percent-encoded with space as `%20`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(parameter, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(parameter.wire_name()),
                    urlencoding::encode(&value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `login_url` with its query replaced by this challenge.
    #[must_use]
    pub fn redirect_url(&self, login_url: &Url) -> Url {
        let mut url = login_url.clone();
        url.set_query(Some(&self.to_query_string()));
        url
    }
}
