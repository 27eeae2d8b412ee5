//! Product catalog service.
//!
//! Keeps the full product set as one durable blob with a single TTL and
//! serves search from a summary projection recomputed from whatever set
//! the current call just returned, so search never sees data older than
//! the list it filters.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::errors::ShopResult;
use crate::domain::models::{Product, ProductSummary};
use crate::domain::ports::ShopApi;
use crate::infrastructure::cache::CacheStore;

pub struct ProductCatalogService<S> {
    api: Arc<S>,
    store: Mutex<CacheStore<Vec<Product>>>,
    ttl_secs: u64,
}

impl<S: ShopApi> ProductCatalogService<S> {
    /// The store is expected to have been `load()`ed already.
    pub fn new(api: Arc<S>, store: CacheStore<Vec<Product>>, ttl_secs: u64) -> Self {
        Self {
            api,
            store: Mutex::new(store),
            ttl_secs,
        }
    }

    /// All product records, from cache when fresh.
    ///
    /// Stored unconditionally after a refresh, empty set included, to
    /// avoid re-fetch storms inside the TTL window.
    pub async fn all(&self) -> ShopResult<Vec<Product>> {
        {
            let store = self.store.lock().await;
            if store.is_fresh(self.ttl_secs) {
                if let Some(products) = store.get() {
                    tracing::debug!(count = products.len(), "product catalog cache hit");
                    return Ok(products.clone());
                }
            }
        }

        let products = self.api.fetch_products().await?;
        tracing::info!(count = products.len(), "product catalog refreshed");

        self.store.lock().await.put(products.clone());
        Ok(products)
    }

    /// Filtered summary projection of the current catalog.
    ///
    /// Name and code filter with case-insensitive substring matches; when
    /// both are supplied a product must satisfy both. An absent or empty
    /// filter matches everything.
    pub async fn search(
        &self,
        name: Option<&str>,
        code: Option<&str>,
    ) -> ShopResult<Vec<ProductSummary>> {
        let products = self.all().await?;
        Ok(products
            .iter()
            .filter(|p| matches_filters(p, name, code))
            .map(ProductSummary::from)
            .collect())
    }
}

fn matches_filters(product: &Product, name: Option<&str>, code: Option<&str>) -> bool {
    let name_ok = match name {
        None => true,
        Some("") => true,
        Some(needle) => product
            .name
            .to_lowercase()
            .contains(&needle.to_lowercase()),
    };
    let code_ok = match code {
        None => true,
        Some("") => true,
        // a product without a code never matches a non-empty code filter
        Some(needle) => product
            .code
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(&needle.to_lowercase())),
    };
    name_ok && code_ok
}
