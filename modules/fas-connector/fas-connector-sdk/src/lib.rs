//! FAS Connector SDK
//!
//! This crate provides the public API for the `fas-connector` module:
//!
//! - [`AccountInfoClient`] - Typed API trait for in-process consumers
//! - [`UserView`], [`MembershipRecord`], [`MembershipPage`] - Domain models
//! - [`AccountInfoError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use fas_connector_sdk::{AccountInfoClient, MembershipsQuery};
//!
//! let view = client.user_info(&env, "alice").await?;
//! let page = client
//!     .user_memberships(&env, &MembershipsQuery::for_user("alice").page(0, 20))
//!     .await?;
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

pub use api::AccountInfoClient;
pub use error::AccountInfoError;
pub use models::{
    APPROVED_MEMBERSHIPS, MembershipPage, MembershipRecord, MembershipsQuery,
    UNAPPROVED_MEMBERSHIPS, UserView,
};
