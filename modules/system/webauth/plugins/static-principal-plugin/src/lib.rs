#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Principal Resolver Plugin
//!
//! This plugin resolves the principal asserted by the WLS without an external
//! user store, for development and testing.
//!
//! ## Modes
//!
//! - **`verbatim`** (default): Trusts the asserted principal as the username and
//!   grants the configured default authorities.
//!
//! - **`directory`**: Looks the principal up in a configured user table and grants
//!   that user's authorities. Unknown principals are rejected.
//!
//! ## Configuration
//!
//! ```yaml
//! static_principal_plugin:
//!   mode: directory
//!   default_authorities: ["ROLE_USER"]
//!   users:
//!     - principal: "hwtb2"
//!       display_name: "H. W. T. Bloggs"
//!       authorities: ["ROLE_USER", "ROLE_ADMIN"]
//! ```

pub mod config;
pub mod domain;

pub use domain::service::Service;
