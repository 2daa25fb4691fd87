//! Challenge parameter registry.
//!
//! The set of parameters a relying application may send to the WLS is closed:
//! every parameter is a variant of [`ChallengeParameter`], and each variant
//! carries its wire name, whether it is required, and the kind of value it
//! accepts.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::InvalidParameterValue;

/// Protocol version sent when none is configured.
pub const DEFAULT_VERSION: i64 = 3;

/// A parameter of the outbound challenge.
///
/// Variants are declared in registry order, which is also the order used when
/// serializing a challenge to a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChallengeParameter {
    /// `ver`: protocol version (integer, required).
    Version,
    /// `url`: the URL the WLS redirects back to (required).
    ReturnUrl,
    /// `desc`: description of the resource being accessed.
    Description,
    /// `aauth`: acceptable authentication types.
    AuthTypes,
    /// `iact`: interaction requirement (`yes` / `no`).
    Interactive,
    /// `msg`: why authentication is being requested.
    Message,
    /// `params`: opaque data echoed back in the response.
    ExtraParams,
    /// `fail`: whether the WLS should handle failures itself.
    FailureMode,
}

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Text,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Text => "a string",
        }
    }
}

impl ChallengeParameter {
    /// All parameters in registry order.
    pub const ALL: [Self; 8] = [
        Self::Version,
        Self::ReturnUrl,
        Self::Description,
        Self::AuthTypes,
        Self::Interactive,
        Self::Message,
        Self::ExtraParams,
        Self::FailureMode,
    ];

    /// Name of the parameter on the wire.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Version => "ver",
            Self::ReturnUrl => "url",
            Self::Description => "desc",
            Self::AuthTypes => "aauth",
            Self::Interactive => "iact",
            Self::Message => "msg",
            Self::ExtraParams => "params",
            Self::FailureMode => "fail",
        }
    }

    /// Look a parameter up by its wire name.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire_name() == name)
    }

    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Version | Self::ReturnUrl)
    }

    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::Version => ValueKind::Integer,
            _ => ValueKind::Text,
        }
    }

    /// Check a value against this parameter's rule.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterValue`] when the value is of the wrong kind.
    pub fn validate(self, value: &ParameterValue) -> Result<(), InvalidParameterValue> {
        let kind = self.value_kind();
        let matches = matches!(
            (kind, value),
            (ValueKind::Integer, ParameterValue::Integer(_))
                | (ValueKind::Text, ParameterValue::Text(_))
        );
        if matches {
            Ok(())
        } else {
            Err(InvalidParameterValue::new(
                self,
                format!("expected {}, got: {value}", kind.name()),
            ))
        }
    }
}

impl fmt::Display for ChallengeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Validate `value` for `parameter`.
///
/// # Errors
///
/// Returns [`InvalidParameterValue`] when the parameter's rule rejects the value.
pub fn validate(
    parameter: ChallengeParameter,
    value: &ParameterValue,
) -> Result<(), InvalidParameterValue> {
    parameter.validate(value)
}

/// The parameters every challenge must carry.
#[must_use]
pub fn required_parameters() -> BTreeSet<ChallengeParameter> {
    ChallengeParameter::ALL
        .into_iter()
        .filter(|p| p.is_required())
        .collect()
}

/// A concrete challenge parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterValue {
    Integer(i64),
    Text(String),
}

impl ParameterValue {
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
