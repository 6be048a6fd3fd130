//! Infrastructure adapters.

pub mod fas_client;

pub use fas_client::FasClient;
