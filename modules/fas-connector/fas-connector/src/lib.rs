//! FAS account connector
//!
//! Exposes user profiles and group memberships of the FAS account service
//! as two query paths:
//!
//! - `userinfo`: one account record, membership lists stripped
//! - `usermemberships`: approved then unapproved memberships, paginated
//!
//! User views are cached per username for a few minutes.
//!
//! ## Configuration
//!
//! ```yaml
//! fedoracommunity:
//!   connector:
//!     fas:
//!       baseurl: "https://admin.fedoraproject.org/accounts"
//!       cache_ttl: "5m"
//! fedora:
//!   clients:
//!     check_certs: "True"
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{FasConnectorConfig, PageEndMode};
pub use module::{FasConnector, USERINFO_PATH, USERMEMBERSHIPS_PATH};
