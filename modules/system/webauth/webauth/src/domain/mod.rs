//! Domain layer for the webauth module.

pub mod challenge;
pub mod entry_point;
pub mod local_client;
pub mod matcher;
pub mod service;

pub use challenge::{ChallengeCreator, ChallengeCreatorBuilder, request_url_producer};
pub use entry_point::EntryPoint;
pub use local_client::WebauthLocalClient;
pub use matcher::{AndRequestMatcher, AnyRequestMatcher, RequestMatcher, ResponseParameterMatcher};
pub use service::{Collaborators, HandshakeState, Service};
