//! Common types and shared interfaces
//!
//! Backend records used by both the API layer and the exporter, plus the
//! traits the exporter depends on.

pub mod traits;
pub mod types;
