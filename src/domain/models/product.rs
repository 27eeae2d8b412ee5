//! Product models: the full backend record, the trimmed summary used by
//! search, feature assignments, and the enriched product returned by the
//! `get-product` tool.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::feature::FeatureType;

/// A product record as returned by the backend.
///
/// Known fields are typed; everything else the backend sends is preserved
/// in `extra` so the "list all products" tool passes the complete record
/// through. Never persisted beyond the catalog cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Product code; external links are derived from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Remaining backend fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Trimmed projection of a [`Product`] for search results.
///
/// Every field is derivable from the full record; the projection is
/// recomputed from whatever set the catalog service just returned, never
/// cached on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_name: Option<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            created_at: product.created_at.clone(),
            updated_at: product.updated_at.clone(),
            price: product.price,
            seo_name: product.seo_name.clone(),
        }
    }
}

/// The association of one feature (and its value) to one product, as
/// returned by the product's feature-assignment sub-resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<u64>,
    /// Display name of the assigned feature; keys the enriched output.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feature_type: FeatureType,
    /// Raw text value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Numeric value, string-encoded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int: Option<String>,
    /// Selected variant for single-variant-reference assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<u64>,
    /// Whether the multi-select variant picker is enabled.
    #[serde(default)]
    pub variant_picker: bool,
    /// Variant id -> label map carried directly on multi-select
    /// assignments; insertion order is the display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<IndexMap<String, String>>,
}

/// Resolved display value of one feature assignment.
///
/// The backend's `value` field shape-shifts by feature type; this tagged
/// form keeps the distinction explicit. Serializes untagged, so JSON
/// output is a plain string, number, or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

/// A [`Product`] augmented with its resolved feature values.
///
/// Built fresh per `get-product` call and never cached; the values depend
/// on live feature-assignment state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedProduct {
    #[serde(flatten)]
    pub product: Product,
    /// One single-entry map per assigned feature, in assignment order,
    /// keyed by the feature's display name.
    pub product_features: Vec<IndexMap<String, FeatureValue>>,
}
