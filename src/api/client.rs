//! Base HTTP client
//!
//! Every backend call goes through [`BaseClient`]: it resolves paths against
//! the configured base URL, attaches the bearer token and a request id, and
//! ends the session when the backend answers `401`.

use super::errors::ApiError;
use super::session::Session;
use crate::config::DeskConfig;
use crate::errors::DeskResult;
use crate::notify::{Notice, Notifier};
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Request id header sent with every call
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Notice shown when the backend rejects the token
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";

/// Raw response body with its declared content type
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Authenticated client for the back-office REST API
#[derive(Clone)]
pub struct BaseClient {
    base_url: Url,
    http: reqwest::Client,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl BaseClient {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            base_url,
            http,
            session,
            notifier,
        })
    }

    pub fn from_config(config: &DeskConfig, session: Arc<Session>, notifier: Arc<dyn Notifier>) -> DeskResult<Self> {
        let base_url = config.resolved_base_url()?;
        Ok(Self::new(base_url, config.request_timeout(), session, notifier)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Resolve an endpoint path beneath the base URL
    pub fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Perform a request and return the JSON body, `Null` for empty bodies
    pub async fn request_value(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path, query)?;
        let response = self.execute(method, url, body, true).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Typed variant of [`request_value`](Self::request_value)
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.request_value(method, path, query, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Download a resource such as an uploaded screenshot.
    ///
    /// Relative URLs are resolved beneath the base URL; the bearer token is
    /// only sent to the backend's own host.
    pub async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes, ApiError> {
        let resolved = match Url::parse(url) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base_url.join(url)?,
            Err(e) => return Err(e.into()),
        };
        let authenticate = self.is_backend_url(&resolved);
        let response = self.execute(Method::GET, resolved, None, authenticate).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedBytes { bytes, content_type })
    }

    fn is_backend_url(&self, url: &Url) -> bool {
        url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default()
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        authenticate: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        debug!("{} {} [{}]", method, url, request_id);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, &request_id);
        if authenticate {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let error = ApiError::from_response(status.as_u16(), &body);
            warn!("{} {} [{}] failed: {}", method, url, request_id, error);
            return Err(error);
        }

        Ok(response)
    }

    fn handle_unauthorized(&self) {
        let was_signed_in = self.session.is_authenticated();
        self.session.logout();
        if was_signed_in {
            warn!("Backend rejected the session token, signing out");
        }
        self.notifier.notify(Notice::warning(SESSION_EXPIRED_MESSAGE));
    }
}
