//! Voxyl Network API client
//!
//! Provides an async HTTP client with:
//! - API key injection as the `api` query parameter
//! - Fixed-delay retry on transient failures
//! - An in-memory response cache keyed by URL

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::domain::player::PlayerId;
use crate::domain::stats::{StatsSnapshot, StatsSource};
use crate::error::{Error, Result};

use super::endpoints::Endpoint;
use super::types::{
    DiscordLookup, GameStats, OverallStats, PlayerInfo, PlayerLookup, snapshot_from,
};

/// Voxyl API base URL
pub const VOXYL_BASE_URL: &str = "https://api.voxyl.net";

/// Retry behaviour for transient request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails permanently, or retries run out
    ///
    /// Exhausted retries surface as `TransientSourceFailure`; non-transient
    /// errors are returned as-is on the first occurrence.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempts > self.max_retries {
                        return Err(Error::TransientSourceFailure {
                            attempts,
                            reason: e.to_string(),
                        });
                    }
                    warn!(
                        attempt = attempts,
                        max_retries = self.max_retries,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %e,
                        "Stats request failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Cached responses; `None` records a "no such record" answer
#[derive(Debug)]
struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Option<Value>)>>,
}

impl ResponseCache {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, url: &str) -> Option<Option<Value>> {
        if self.ttl.is_zero() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(url)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    async fn insert(&self, url: String, value: Option<Value>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(url, (Instant::now(), value));
    }
}

/// Voxyl Network API client
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct VoxylClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for VoxylClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxylClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("cache_ttl", &self.cache.ttl)
            .finish()
    }
}

/// Builder for creating a VoxylClient
pub struct VoxylClientBuilder {
    config: Option<ApiConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    retry: Option<RetryPolicy>,
    cache_ttl: Option<Duration>,
}

impl Default for VoxylClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxylClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: None,
            api_key: None,
            base_url: None,
            timeout_secs: None,
            retry: None,
            cache_ttl: None,
        }
    }

    /// Take base URL, timeout, retry and cache settings from config
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL (defaults to the public Voxyl API)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Set how long responses are cached; zero disables caching
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Build the VoxylClient
    pub fn build(self) -> Result<VoxylClient> {
        let config = self.config.unwrap_or_default();
        let api_key = self.api_key.filter(|key| !key.trim().is_empty()).ok_or_else(|| {
            Error::ConfigError(
                "API key is required. Set VOXSTATS_API_KEY or API_KEY environment variable."
                    .to_string(),
            )
        })?;

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        let retry = self.retry.unwrap_or(RetryPolicy {
            max_retries: config.max_retries,
            delay: Duration::from_secs(config.retry_delay_secs),
        });
        let cache_ttl = self
            .cache_ttl
            .unwrap_or_else(|| Duration::from_secs(config.cache_ttl_secs));
        let base_url = self.base_url.unwrap_or(config.base_url);

        Ok(VoxylClient {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
            cache: Arc::new(ResponseCache::new(cache_ttl)),
        })
    }
}

impl VoxylClient {
    /// Create a client from config with the given API key
    pub fn new(config: ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        VoxylClientBuilder::new()
            .config(config)
            .api_key(api_key)
            .build()
    }

    /// Create a builder for the client
    pub fn builder() -> VoxylClientBuilder {
        VoxylClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET an endpoint, returning `None` when the API has no such record
    pub async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint.path());

        if let Some(cached) = self.cache.get(&url).await {
            debug!(url = %url, "Serving cached response");
            return Ok(cached);
        }

        let value = self.retry.run(|| self.send_request(&url)).await?;
        self.cache.insert(url, value.clone()).await;
        Ok(value)
    }

    /// GET an endpoint and decode its body
    pub async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<Option<T>> {
        match self.get_json(endpoint).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Error::BadResponse(format!("{}: {}", endpoint.path(), e))),
            None => Ok(None),
        }
    }

    /// Send a single request to the API
    async fn send_request(&self, url: &str) -> Result<Option<Value>> {
        debug!(url = %url, "Sending Voxyl API request");

        let response = self
            .http_client
            .get(url)
            .query(&[("api", self.api_key.as_str())])
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body = response.text().await.map_err(Error::NetworkError)?;
                let value: Value = serde_json::from_str(&body)
                    .map_err(|e| Error::BadResponse(format!("Invalid JSON: {}", e)))?;
                Ok(Some(value))
            }
            400 => Ok(None),
            429 => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::RateLimited(body))
            }
            other => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::UnexpectedStatus(other, body))
            }
        }
    }

    /// Login details for a player, `None` when the API knows nothing of them
    pub async fn player_info(&self, player: &PlayerId) -> Result<Option<PlayerInfo>> {
        self.get(Endpoint::PlayerInfo(player.as_str())).await
    }

    /// Whether the player has ever joined the server
    pub async fn has_ever_played(&self, player: &PlayerId) -> Result<bool> {
        Ok(self
            .player_info(player)
            .await?
            .is_some_and(|info| info.last_login_time.is_some()))
    }

    /// Discord account the player integrated with the network, if any
    pub async fn discord_for_player(&self, player: &PlayerId) -> Result<Option<u64>> {
        let lookup: Option<DiscordLookup> =
            self.get(Endpoint::DiscordFromPlayer(player.as_str())).await?;
        Ok(lookup.and_then(|l| l.id).and_then(|id| id.as_u64()))
    }

    /// Player a Discord account integrated with the network, if any
    pub async fn player_for_discord(&self, discord_id: u64) -> Result<Option<PlayerId>> {
        let lookup: Option<PlayerLookup> =
            self.get(Endpoint::PlayerFromDiscord(discord_id)).await?;
        match lookup.and_then(|l| l.uuid) {
            Some(uuid) => PlayerId::from_uuid_str(&uuid).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StatsSource for VoxylClient {
    /// Fetch overall and per-mode stats together and merge them
    async fn fetch(&self, player: &PlayerId) -> Result<StatsSnapshot> {
        let uuid = player.as_str();
        let (overall, game) = tokio::try_join!(
            self.get::<OverallStats>(Endpoint::PlayerOverall(uuid)),
            self.get::<GameStats>(Endpoint::PlayerGameStats(uuid)),
        )?;

        match (overall, game) {
            (Some(overall), Some(game)) => Ok(snapshot_from(&overall, &game)),
            _ => Err(Error::SourceUnavailable(player.to_string())),
        }
    }
}
