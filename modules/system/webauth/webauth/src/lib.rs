//! Webauth Module
//!
//! Relying-party side of the WLS redirect handshake. Builds the challenge a
//! visitor is redirected to the WLS with, recognizes the redirect back, and
//! drives the returned response through validation and principal resolution
//! to an authenticated credential token.
//!
//! [`module::init`] wires the [`webauth_sdk::WebauthClient`] from a
//! [`config::WebauthConfig`] and host-supplied collaborators.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;
