//! Domain layer for the FAS connector.

pub mod cache;
pub mod local_client;
pub mod params;
pub mod ports;
pub mod service;

pub use cache::UserViewCache;
pub use local_client::AccountInfoLocalClient;
pub use ports::{AccountServicePort, AuthParams};
pub use service::Service;
