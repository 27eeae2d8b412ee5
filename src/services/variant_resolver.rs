//! Three-tier feature variant resolution.
//!
//! The backend exposes a feature's variants only as a per-feature
//! sub-resource, so enriching a whole catalog naively costs one request
//! per feature. Resolution therefore consults, in order: the in-process
//! map, the durable per-feature file, and finally the backend, populating
//! the lower tiers on the way back. Variants are assumed stable for a
//! feature's lifetime; the durable tier has no TTL.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;

use crate::domain::models::{Feature, FeatureRecord, VariantSet};
use crate::domain::ports::ShopApi;
use crate::infrastructure::cache::{VariantFileStore, VariantMemory};

pub struct VariantResolver<S> {
    api: Arc<S>,
    files: VariantFileStore,
    memory: RwLock<VariantMemory>,
}

impl<S: ShopApi> VariantResolver<S> {
    pub fn new(api: Arc<S>, files: VariantFileStore) -> Self {
        Self {
            api,
            files,
            memory: RwLock::new(VariantMemory::new()),
        }
    }

    /// Enrich one feature record with its variant set.
    ///
    /// A record without an identifier resolves to an empty set without any
    /// lookup. A backend failure yields [`VariantSet::Failed`] and is not
    /// cached, so the next resolution of the same feature retries.
    pub async fn resolve(&self, record: FeatureRecord) -> Feature {
        let Some(feature_id) = record.id else {
            return Feature::from_record(record, VariantSet::Resolved(Vec::new()));
        };

        if let Some(variants) = self.memory.read().await.get(&feature_id).cloned() {
            return Feature::from_record(record, VariantSet::Resolved(variants));
        }

        if let Some(variants) = self.files.read(feature_id) {
            self.memory
                .write()
                .await
                .insert(feature_id, variants.clone());
            return Feature::from_record(record, VariantSet::Resolved(variants));
        }

        match self.api.fetch_feature_variants(feature_id).await {
            Ok(variants) => {
                self.files.write(feature_id, &variants);
                self.memory
                    .write()
                    .await
                    .insert(feature_id, variants.clone());
                Feature::from_record(record, VariantSet::Resolved(variants))
            }
            Err(e) => {
                tracing::warn!(feature_id, error = %e, "variant resolution failed");
                Feature::from_record(record, VariantSet::Failed)
            }
        }
    }

    /// Resolve every record concurrently, preserving input order.
    pub async fn resolve_all(&self, records: Vec<FeatureRecord>) -> Vec<Feature> {
        join_all(records.into_iter().map(|record| self.resolve(record))).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::models::{FeatureType, Variant};
    use crate::services::test_support::MockShop;

    fn record(id: Option<u64>, description: &str) -> FeatureRecord {
        FeatureRecord {
            id,
            description: description.to_string(),
            feature_type: FeatureType::MultiSelect,
        }
    }

    fn resolver_in(dir: &TempDir, mock: Arc<MockShop>) -> VariantResolver<MockShop> {
        VariantResolver::new(mock, VariantFileStore::new(dir.path().join("variants")))
    }

    #[tokio::test]
    async fn test_record_without_id_resolves_empty_without_lookup() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop::default());
        let resolver = resolver_in(&dir, mock.clone());

        let feature = resolver.resolve(record(None, "Orphan")).await;
        assert_eq!(feature.variants, VariantSet::Resolved(vec![]));
        assert_eq!(mock.variant_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_resolution_served_from_memory() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop {
            variants: HashMap::from([(12, vec![Variant { id: 1, label: "Red".to_string() }])]),
            ..MockShop::default()
        });
        let resolver = resolver_in(&dir, mock.clone());

        let first = resolver.resolve(record(Some(12), "Color")).await;
        let second = resolver.resolve(record(Some(12), "Color")).await;
        assert_eq!(first.variants, second.variants);
        // at most one backend call for the same feature id
        assert_eq!(mock.variant_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_durable_tier_avoids_backend_entirely() {
        let dir = TempDir::new().unwrap();
        let files = VariantFileStore::new(dir.path().join("variants"));
        files.write(5, &[Variant { id: 9, label: "XL".to_string() }]);

        let mock = Arc::new(MockShop::default());
        let resolver = resolver_in(&dir, mock.clone());

        let feature = resolver.resolve(record(Some(5), "Size")).await;
        assert_eq!(feature.variants.find_label(9), Some("XL"));
        assert_eq!(mock.variant_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_yields_failed_and_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop {
            fail_variants: true,
            ..MockShop::default()
        });
        let resolver = resolver_in(&dir, mock.clone());

        let first = resolver.resolve(record(Some(3), "Material")).await;
        assert_eq!(first.variants, VariantSet::Failed);

        // the failure was not written to either tier, so the next call retries
        let second = resolver.resolve(record(Some(3), "Material")).await;
        assert_eq!(second.variants, VariantSet::Failed);
        assert_eq!(mock.variant_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_all_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockShop {
            variants: HashMap::from([
                (1, vec![Variant { id: 10, label: "A".to_string() }]),
                (2, vec![Variant { id: 20, label: "B".to_string() }]),
            ]),
            ..MockShop::default()
        });
        let resolver = resolver_in(&dir, mock);

        let records = vec![
            record(Some(2), "Second"),
            record(None, "Orphan"),
            record(Some(1), "First"),
        ];
        let features = resolver.resolve_all(records).await;
        let names: Vec<&str> = features.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(names, ["Second", "Orphan", "First"]);
        assert_eq!(features[0].variants.find_label(20), Some("B"));
        assert_eq!(features[2].variants.find_label(10), Some("A"));
    }
}
