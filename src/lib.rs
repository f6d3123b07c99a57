//! casino-desk - back-office client for casino profiles
//!
//! Typed access to the back-office REST backend (casinos, profile matrix,
//! bonuses, payments, promos, test accounts, emails, comments) behind a
//! tag-invalidated query cache, and an exporter that turns one casino into a
//! standalone interactive HTML report.

pub mod api;
pub mod common;
pub mod config;
pub mod errors;
pub mod export;
pub mod notify;
pub mod services;

pub use api::{ApiError, BackofficeApi, BaseClient, QueryCache, Session, TokenStore};
pub use common::traits::ImageEmbedder;
pub use common::types::*;
pub use config::{ConfigLoader, DeskConfig, Environment};
pub use errors::{ConfigurationError, DeskError, DeskResult};
pub use export::{
    export_profile_to_interactive_html, load_snapshot, ExportError, ExportSnapshot, ExportedDocument,
    HttpImageEmbedder, SnapshotOptions,
};
pub use notify::{run_mutation, MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use services::DeskServices;
