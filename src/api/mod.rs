//! Back-office REST client
//!
//! Data-access layer over the backend: authenticated base client, declarative
//! endpoint table, tag-invalidated query cache and the typed operations built
//! on top of them.

pub mod cache;
pub mod client;
pub mod endpoints;
pub mod errors;
pub mod resources;
pub mod session;

pub use cache::{CacheStats, QueryCache};
pub use client::BaseClient;
pub use errors::ApiError;
pub use resources::BackofficeApi;
pub use session::{Session, TokenStore};
