//! REST client for the keg tracker server.
//!
//! [`KegApi`] is the seam between the client logic and the network. The
//! real implementation is [`HttpKegApi`]; [`crate::MemoryBackend`] serves the
//! same contract from memory for demos and tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use keg_core::{ClientConfig, HttpKegApi, KegApi};
//!
//! # async fn example() -> Result<(), keg_core::KegError> {
//! let api = HttpKegApi::new(&ClientConfig::new("http://localhost:8000")?)?;
//! let kegs = api.list_kegs().await?;
//! println!("{} kegs", kegs.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{KegError, KegResult};
use crate::types::{
    Batch, BreweryInfo, Health, Keg, KegEvent, KegId, KegUpdate, StatsPayload, SyncReport,
};

/// Operations offered by the keg tracker server.
pub trait KegApi: Send + Sync {
    /// `GET /api/kegs`.
    fn list_kegs(&self) -> impl Future<Output = KegResult<Vec<Keg>>> + Send;

    /// `GET /api/batches`.
    fn list_batches(&self) -> impl Future<Output = KegResult<Vec<Batch>>> + Send;

    /// `GET /api/stats`.
    fn stats(&self) -> impl Future<Output = KegResult<StatsPayload>> + Send;

    /// `GET /api/stats/events`.
    fn recent_events(&self) -> impl Future<Output = KegResult<Vec<KegEvent>>> + Send;

    /// `GET /api/settings/brewery`.
    fn brewery(&self) -> impl Future<Output = KegResult<BreweryInfo>> + Send;

    /// `GET /health`.
    fn health(&self) -> impl Future<Output = KegResult<Health>> + Send;

    /// `POST /api/kegs`: create a blank keg.
    fn create_keg(&self) -> impl Future<Output = KegResult<Keg>> + Send;

    /// `PUT /api/kegs/{id}`.
    fn update_keg(&self, id: KegId, update: &KegUpdate) -> impl Future<Output = KegResult<Keg>> + Send;

    /// `POST /api/kegs/{id}/reset`: clear batch, location and notes.
    fn reset_keg(&self, id: KegId) -> impl Future<Output = KegResult<Keg>> + Send;

    /// `DELETE /api/kegs/{id}`.
    fn delete_keg(&self, id: KegId) -> impl Future<Output = KegResult<()>> + Send;

    /// `POST /api/batches/sync`: pull batches from the brewing-data service.
    fn sync_batches(&self) -> impl Future<Output = KegResult<SyncReport>> + Send;
}

/// HTTP implementation of [`KegApi`].
#[derive(Debug, Clone)]
pub struct HttpKegApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpKegApi {
    /// Build a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> KegResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| KegError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Server address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and decode the JSON answer.
    ///
    /// A body, when given, is sent as JSON with a JSON content type. Any
    /// non-success status becomes [`KegError::Api`] carrying the body's
    /// `detail` or the status line.
    pub async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> KegResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        trace!(%method, path, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "Response received");

        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(KegError::api(status.as_u16(), error_message(status, &bytes)));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> KegResult<T> {
        self.call::<T, Value>(Method::GET, path, None).await
    }
}

/// Message for a failed response: `detail` if present, else the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
        _ => status_line(status),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

impl KegApi for HttpKegApi {
    async fn list_kegs(&self) -> KegResult<Vec<Keg>> {
        self.get("/api/kegs").await
    }

    async fn list_batches(&self) -> KegResult<Vec<Batch>> {
        self.get("/api/batches").await
    }

    async fn stats(&self) -> KegResult<StatsPayload> {
        self.get("/api/stats").await
    }

    async fn recent_events(&self) -> KegResult<Vec<KegEvent>> {
        self.get("/api/stats/events").await
    }

    async fn brewery(&self) -> KegResult<BreweryInfo> {
        self.get("/api/settings/brewery").await
    }

    async fn health(&self) -> KegResult<Health> {
        self.get("/health").await
    }

    async fn create_keg(&self) -> KegResult<Keg> {
        self.call::<_, Value>(Method::POST, "/api/kegs", None).await
    }

    async fn update_keg(&self, id: KegId, update: &KegUpdate) -> KegResult<Keg> {
        self.call(Method::PUT, &format!("/api/kegs/{id}"), Some(update)).await
    }

    async fn reset_keg(&self, id: KegId) -> KegResult<Keg> {
        self.call::<_, Value>(Method::POST, &format!("/api/kegs/{id}/reset"), None)
            .await
    }

    async fn delete_keg(&self, id: KegId) -> KegResult<()> {
        let _: Value = self
            .call::<_, Value>(Method::DELETE, &format!("/api/kegs/{id}"), None)
            .await?;
        Ok(())
    }

    async fn sync_batches(&self) -> KegResult<SyncReport> {
        self.call::<_, Value>(Method::POST, "/api/batches/sync", None).await
    }
}
