//! Reference implementations of the handshake collaborators.

pub mod parser;
pub mod request_cache;

pub use parser::WlsResponseParser;
pub use request_cache::InMemoryRequestCache;
