//! User-facing notices
//!
//! Transient messages shown after a mutation or a session change. The CLI
//! routes them through `tracing`; tests collect them in memory.

use crate::api::errors::ApiError;
use std::future::Future;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits notices as log events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{}", notice.message),
            NoticeLevel::Warning => tracing::warn!("{}", notice.message),
            NoticeLevel::Error => tracing::error!("{}", notice.message),
        }
    }
}

/// Keeps every notice, for assertions
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

/// Await a mutation and report its outcome.
///
/// Validation errors are returned without a notice so the caller can show
/// them next to the offending fields. `Unauthorized` was already announced
/// by the client when the session ended.
pub async fn run_mutation<T, F>(notifier: &dyn Notifier, success_message: &str, mutation: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match mutation.await {
        Ok(value) => {
            notifier.notify(Notice::success(success_message));
            Ok(value)
        }
        Err(error) => {
            match &error {
                ApiError::Validation { .. } | ApiError::Unauthorized => {}
                other => notifier.notify(Notice::error(other.user_message())),
            }
            Err(error)
        }
    }
}
