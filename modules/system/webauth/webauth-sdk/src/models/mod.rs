//! Domain models for the webauth module.

pub mod challenge;
pub mod params;
pub mod request;
pub mod response;
pub mod token;

pub use challenge::ChallengeDescriptor;
pub use params::{
    ChallengeParameter, DEFAULT_VERSION, ParameterValue, ValueKind, required_parameters, validate,
};
pub use request::RequestDescriptor;
pub use response::{ResponseDescriptor, ResponseDescriptorBuilder, STATUS_SUCCESS, describe_status};
pub use token::{
    Authority, CredentialToken, Credentials, Principal, TokenCredentials, UserIdentity,
};
