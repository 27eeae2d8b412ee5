//! Single-product enrichment.
//!
//! The backend returns a product's feature assignments in a raw form
//! whose `value` shape-shifts by feature type, and variant references as
//! bare ids. Enrichment joins each assignment against the resolved
//! feature catalog and flattens the result into a display-ready
//! name -> value list attached to the product.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::domain::errors::ShopResult;
use crate::domain::models::{
    EnrichedProduct, Feature, FeatureAssignment, FeatureType, FeatureValue,
};
use crate::domain::ports::ShopApi;
use crate::services::feature_catalog::FeatureCatalogService;

pub struct ProductEnricher<S> {
    api: Arc<S>,
    catalog: Arc<FeatureCatalogService<S>>,
}

impl<S: ShopApi> ProductEnricher<S> {
    pub fn new(api: Arc<S>, catalog: Arc<FeatureCatalogService<S>>) -> Self {
        Self { api, catalog }
    }

    /// Fetch one product with its resolved feature values.
    ///
    /// The product record and its assignments are fetched concurrently;
    /// either failure fails the whole operation. The catalog is resolved
    /// once up front, and a catalog refresh error degrades to an empty
    /// catalog instead of failing the product fetch; per-feature
    /// resolution then falls back to raw values.
    pub async fn enrich(&self, product_id: u64) -> ShopResult<EnrichedProduct> {
        let catalog = match self.catalog.catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "feature catalog unavailable, enriching without it");
                Vec::new()
            }
        };

        let (product, assignments) = tokio::try_join!(
            self.api.fetch_product(product_id),
            self.api.fetch_product_features(product_id),
        )?;

        let product_features = assignments
            .iter()
            .map(|assignment| {
                let mut entry = IndexMap::new();
                entry.insert(
                    assignment.description.clone(),
                    resolve_assignment_value(assignment, &catalog),
                );
                entry
            })
            .collect();

        Ok(EnrichedProduct {
            product,
            product_features,
        })
    }
}

/// Resolve one assignment's display value against the catalog.
///
/// Rules, in order:
/// 1. multi-select with the picker on and an inline variant map: the
///    ordered list of that map's labels;
/// 2. numeric type: the string-encoded integer coerced to a number
///    (unparsable input falls through to the raw value);
/// 3. a variant reference the catalog can label: that label;
/// 4. otherwise the raw value, unmodified.
fn resolve_assignment_value(assignment: &FeatureAssignment, catalog: &[Feature]) -> FeatureValue {
    if assignment.feature_type == FeatureType::MultiSelect && assignment.variant_picker {
        if let Some(variants) = &assignment.variants {
            return FeatureValue::List(variants.values().cloned().collect());
        }
    }

    if assignment.feature_type == FeatureType::Number {
        if let Some(number) = assignment
            .value_int
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
        {
            return FeatureValue::Number(number);
        }
    }

    if let (Some(feature_id), Some(variant_id)) = (assignment.feature_id, assignment.variant_id) {
        let label = catalog
            .iter()
            .find(|f| f.id == Some(feature_id))
            .and_then(|f| f.variants.find_label(variant_id));
        if let Some(label) = label {
            return FeatureValue::Text(label.to_string());
        }
    }

    FeatureValue::Text(assignment.value.clone().unwrap_or_default())
}
