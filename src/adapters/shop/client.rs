//! Shop backend HTTP client with rate limiting and pagination draining.
//!
//! Wraps the shop REST API, providing the typed fetches behind [`ShopApi`].
//! The backend is slow and rate-limited; a token-bucket limiter keeps the
//! drain inside the request budget, and the caching services above this
//! client keep most calls from reaching it at all.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::domain::errors::{ShopError, ShopResult};
use crate::domain::models::{FeatureAssignment, FeatureRecord, Order, Product, Variant};
use crate::domain::ports::ShopApi;
use crate::infrastructure::config::ShopConfig;

/// Requests allowed per rate-limit window.
const RATE_LIMIT_CAPACITY: u32 = 100;

/// Duration of the rate-limit window.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Per-request timeout. A single bounded request, no retry loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets and a token becomes available.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens in the bucket.
    capacity: u32,
    /// Current available tokens.
    tokens: u32,
    /// Duration of the refill window.
    window: Duration,
    /// When the current window started.
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given capacity and window.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Acquire a single token, sleeping if necessary.
    ///
    /// If the current window has elapsed, the bucket is refilled.
    /// If no tokens are available, this method sleeps until the
    /// window resets.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            // Refill the bucket and start a new window.
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            // Sleep until the window resets.
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "shop rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            // After sleeping, refill and consume one token.
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// HTTP client for the shop REST API.
///
/// All methods return [`ShopResult`] with the failing resource named in
/// the error. Collection endpoints are paginated; the drain issues
/// sequential page requests and stops at the first short or empty page.
#[derive(Debug, Clone)]
pub struct ShopClient {
    /// The underlying HTTP client.
    http: Client,
    /// Backend base URL without a trailing slash.
    base_url: String,
    /// Precomputed `Basic` credential header value.
    auth_header: String,
    /// Items requested per page.
    page_size: u32,
    /// Shared rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ShopClient {
    /// Create a new client from the shop configuration.
    pub fn new(config: &ShopConfig) -> ShopResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ShopError::ClientBuild(e.to_string()))?;
        let credential = format!("{}:{}", config.email, config.api_key);
        let rate_limiter = RateLimiter::new(RATE_LIMIT_CAPACITY, RATE_LIMIT_WINDOW);
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", BASE64.encode(credential)),
            page_size: config.page_size,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }

    /// Acquire a rate-limit token and issue a GET, returning the decoded
    /// JSON body.
    async fn get_json(&self, resource: &'static str, url: &str) -> ShopResult<serde_json::Value> {
        self.rate_limiter.lock().await.acquire().await;
        let resp = self
            .http
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ShopError::transport(resource, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ShopError::backend(resource, status, body));
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| ShopError::decode(resource, e.to_string()))
    }

    /// Drain every page of a collection endpoint into one sequence.
    ///
    /// A page shorter than the page size (or empty) is the last page; no
    /// trailing request is issued after it. Any failure aborts the drain
    /// and discards partial results.
    async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        key: &str,
    ) -> ShopResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}{}?page={}&itemsPerPage={}",
                self.base_url, path, page, self.page_size
            );
            let body = self.get_json(resource, &url).await?;
            let items: Vec<T> = decode_collection(resource, &body, key)?;
            let count = items.len();
            all.extend(items);
            tracing::debug!(resource, page, count, "page drained");
            if count < self.page_size as usize {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    /// Fetch a single object nested under `key`.
    async fn fetch_object<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        key: &str,
    ) -> ShopResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.get_json(resource, &url).await?;
        let value = body
            .get(key)
            .cloned()
            .ok_or_else(|| ShopError::decode(resource, format!("missing `{key}` key")))?;
        serde_json::from_value(value).map_err(|e| ShopError::decode(resource, e.to_string()))
    }
}

/// Decode the named collection field out of a response body.
///
/// A missing key or a non-array value normalizes to an empty collection;
/// elements that are present must decode, or the whole page is rejected.
fn decode_collection<T: DeserializeOwned>(
    resource: &'static str,
    body: &serde_json::Value,
    key: &str,
) -> ShopResult<Vec<T>> {
    match body.get(key) {
        Some(value) if value.is_array() => serde_json::from_value(value.clone())
            .map_err(|e| ShopError::decode(resource, e.to_string())),
        Some(_) | None => Ok(Vec::new()),
    }
}

#[async_trait::async_trait]
impl ShopApi for ShopClient {
    async fn fetch_features(&self) -> ShopResult<Vec<FeatureRecord>> {
        self.fetch_all_pages("features", "/api/v2/features", "features")
            .await
    }

    async fn fetch_feature_variants(&self, feature_id: u64) -> ShopResult<Vec<Variant>> {
        let path = format!("/api/v2/features/{feature_id}/variants");
        let url = format!("{}{}", self.base_url, path);
        let body = self.get_json("feature variants", &url).await?;
        decode_collection("feature variants", &body, "variants")
    }

    async fn fetch_products(&self) -> ShopResult<Vec<Product>> {
        self.fetch_all_pages("products", "/api/v2/products", "products")
            .await
    }

    async fn fetch_product(&self, product_id: u64) -> ShopResult<Product> {
        let path = format!("/api/v2/products/{product_id}");
        self.fetch_object("product", &path, "product").await
    }

    async fn fetch_product_features(
        &self,
        product_id: u64,
    ) -> ShopResult<Vec<FeatureAssignment>> {
        let path = format!("/api/v2/products/{product_id}/features");
        let url = format!("{}{}", self.base_url, path);
        let body = self.get_json("product features", &url).await?;
        decode_collection("product features", &body, "features")
    }

    async fn fetch_order(&self, order_id: u64) -> ShopResult<Order> {
        let path = format!("/api/v2/orders/{order_id}");
        self.fetch_object("order", &path, "order").await
    }
}
