//! Feature catalog service.
//!
//! Drains every feature definition, enriches each with its variant set,
//! and keeps the enriched catalog as one durable blob with a single TTL.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::errors::ShopResult;
use crate::domain::models::Feature;
use crate::domain::ports::ShopApi;
use crate::infrastructure::cache::CacheStore;
use crate::services::variant_resolver::VariantResolver;

pub struct FeatureCatalogService<S> {
    api: Arc<S>,
    resolver: Arc<VariantResolver<S>>,
    store: Mutex<CacheStore<Vec<Feature>>>,
    ttl_secs: u64,
}

impl<S: ShopApi> FeatureCatalogService<S> {
    /// The store is expected to have been `load()`ed already.
    pub fn new(
        api: Arc<S>,
        resolver: Arc<VariantResolver<S>>,
        store: CacheStore<Vec<Feature>>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            api,
            resolver,
            store: Mutex::new(store),
            ttl_secs,
        }
    }

    /// The full enriched catalog, from cache when fresh.
    ///
    /// On a miss the whole catalog is re-drained and re-enriched, then
    /// stored unconditionally; an empty result set is a valid cached
    /// value. The store lock is not held across the refresh, so two
    /// concurrent misses both refresh and the last write wins.
    pub async fn catalog(&self) -> ShopResult<Vec<Feature>> {
        {
            let store = self.store.lock().await;
            if store.is_fresh(self.ttl_secs) {
                if let Some(features) = store.get() {
                    tracing::debug!(count = features.len(), "feature catalog cache hit");
                    return Ok(features.clone());
                }
            }
        }

        let records = self.api.fetch_features().await?;
        let features = self.resolver.resolve_all(records).await;
        tracing::info!(count = features.len(), "feature catalog refreshed");

        self.store.lock().await.put(features.clone());
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::models::{FeatureRecord, FeatureType, Variant, VariantSet};
    use crate::infrastructure::cache::VariantFileStore;
    use crate::services::test_support::MockShop;

    fn service_in(
        dir: &TempDir,
        mock: Arc<MockShop>,
        ttl_secs: u64,
    ) -> FeatureCatalogService<MockShop> {
        let resolver = Arc::new(VariantResolver::new(
            mock.clone(),
            VariantFileStore::new(dir.path().join("variants")),
        ));
        let mut store = CacheStore::new(dir.path(), "features");
        store.load();
        FeatureCatalogService::new(mock, resolver, store, ttl_secs)
    }

    #[tokio::test]
    async fn test_refresh_drains_and_enriches() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop {
            features: vec![FeatureRecord {
                id: Some(12),
                description: "Color".to_string(),
                feature_type: FeatureType::MultiSelect,
            }],
            variants: HashMap::from([(12, vec![Variant { id: 1, label: "Red".to_string() }])]),
            ..MockShop::default()
        });

        let service = service_in(&dir, mock.clone(), 3600);
        let catalog = service.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].variants.find_label(1), Some("Red"));
        assert_eq!(mock.feature_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_backend() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop {
            features: vec![FeatureRecord {
                id: None,
                description: "Anything".to_string(),
                feature_type: FeatureType::Text,
            }],
            ..MockShop::default()
        });

        let service = service_in(&dir, mock.clone(), 3600);
        service.catalog().await.unwrap();
        service.catalog().await.unwrap();
        assert_eq!(mock.feature_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_refreshes_every_call() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop::default());
        let service = service_in(&dir, mock.clone(), 0);
        service.catalog().await.unwrap();
        service.catalog().await.unwrap();
        assert_eq!(mock.feature_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_cached_and_persisted() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop::default());
        let service = service_in(&dir, mock.clone(), 3600);

        let catalog = service.catalog().await.unwrap();
        assert!(catalog.is_empty());
        assert!(dir.path().join("features.json").exists());

        // second call is a cache hit on the empty payload
        service.catalog().await.unwrap();
        assert_eq!(mock.feature_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let mock = MockShop {
            fail_features: true,
            ..MockShop::default()
        };
        let service = service_in(&dir, Arc::new(mock), 3600);
        let err = service.catalog().await.unwrap_err();
        assert!(err.to_string().contains("features"));
    }

    #[tokio::test]
    async fn test_one_failed_variant_does_not_block_the_catalog() {
        let dir = TempDir::new().unwrap();
        let mock = MockShop {
            features: vec![
                FeatureRecord {
                    id: Some(1),
                    description: "Breaks".to_string(),
                    feature_type: FeatureType::MultiSelect,
                },
                FeatureRecord {
                    id: None,
                    description: "Fine".to_string(),
                    feature_type: FeatureType::Text,
                },
            ],
            fail_variants: true,
            ..MockShop::default()
        };
        let service = service_in(&dir, Arc::new(mock), 3600);

        let catalog = service.catalog().await.unwrap();
        assert_eq!(catalog[0].variants, VariantSet::Failed);
        assert_eq!(catalog[1].variants, VariantSet::Resolved(vec![]));
    }
}
