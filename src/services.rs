//! Service container wiring configuration into the runtime components
//!
//! Builds the session, base client, query cache and typed API once so the
//! CLI (or an embedding application) works against a single shared set.

use crate::{
    api::{BackofficeApi, BaseClient, QueryCache, Session, TokenStore},
    config::DeskConfig,
    errors::DeskResult,
    export::HttpImageEmbedder,
    notify::Notifier,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct DeskServices {
    config: DeskConfig,
    notifier: Arc<dyn Notifier>,
    cache: Arc<QueryCache>,
    api: BackofficeApi,
}

impl DeskServices {
    /// Create the services for `config`, restoring any stored session
    pub fn new(config: DeskConfig, notifier: Arc<dyn Notifier>) -> DeskResult<Self> {
        let session = Arc::new(Self::create_session(&config)?);
        let client = BaseClient::from_config(&config, session, Arc::clone(&notifier))?;
        let cache = Arc::new(QueryCache::new(config.cache.capacity, config.cache_ttl()));
        let api = BackofficeApi::new(client, Arc::clone(&cache));

        Ok(Self {
            config,
            notifier,
            cache,
            api,
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn api(&self) -> &BackofficeApi {
        &self.api
    }

    /// Image embedder for exports, `None` when embedding is switched off
    pub fn image_embedder(&self) -> Option<HttpImageEmbedder> {
        self.config.export.embed_images.then(|| {
            HttpImageEmbedder::new(self.api.client().clone(), self.config.export.image_concurrency)
        })
    }

    /// Periodically drop expired cache entries
    pub fn spawn_cache_cleanup(&self) -> JoinHandle<()> {
        QueryCache::start_cleanup_task(Arc::clone(&self.cache), self.config.cache_ttl())
    }

    fn create_session(config: &DeskConfig) -> DeskResult<Session> {
        Ok(Session::load(TokenStore::new(config.token_path()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    #[tokio::test]
    async fn test_services_restore_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "stored-token\n").unwrap();

        let mut config = DeskConfig::development();
        config.api.token_path = Some(token_path.to_string_lossy().to_string());
        config.export.embed_images = false;

        let services = DeskServices::new(config, Arc::new(MemoryNotifier::new())).unwrap();

        assert_eq!(services.api().client().session().token().as_deref(), Some("stored-token"));
        assert_eq!(services.api().client().base_url().as_str(), "http://localhost:5000/api/");
        assert!(services.image_embedder().is_none());
    }
}
