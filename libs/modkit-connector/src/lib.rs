#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Connector contract for the query layer.
//!
//! A connector exposes a remote data source as a set of named query paths.
//! The host drives it through three capabilities:
//!
//! - [`Connector::register`] declares paths, columns and defaults in a [`PathRegistry`]
//! - [`Call::call`] forwards a raw request to the remote source
//! - [`Query::query`] answers a [`QueryRequest`] for a registered path
//!
//! Filters arrive as loosely typed JSON and are resolved through a
//! [`ParamFilter`] before a handler sees them.

pub mod connector;
pub mod env;
pub mod error;
pub mod filter;
pub mod registry;
pub mod request;

pub use connector::{Call, Connector, Query, RemoteResponse, ResponseMeta};
pub use env::{Identity, LoginInfo, RequestEnv};
pub use error::{ConnectorError, FilterError};
pub use filter::{ParamFilter, ResolvedFilters, is_truthy};
pub use registry::{ColumnSpec, PathRegistry, QueryPath};
pub use request::{QueryRequest, QueryResult, SortOrder};
