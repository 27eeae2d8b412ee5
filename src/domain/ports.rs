//! Ports: the seam between the services and the backend HTTP client.

use async_trait::async_trait;

use crate::domain::errors::ShopResult;
use crate::domain::models::{FeatureAssignment, FeatureRecord, Order, Product, Variant};

/// Read-only access to the shop backend.
///
/// The collection fetches drain every page before returning; a failed page
/// aborts the whole drain. Implemented by the HTTP client and by in-memory
/// fakes in tests.
#[async_trait]
pub trait ShopApi: Send + Sync + 'static {
    /// All feature definitions, pagination drained.
    async fn fetch_features(&self) -> ShopResult<Vec<FeatureRecord>>;

    /// The variant set of one feature.
    async fn fetch_feature_variants(&self, feature_id: u64) -> ShopResult<Vec<Variant>>;

    /// All products, pagination drained.
    async fn fetch_products(&self) -> ShopResult<Vec<Product>>;

    /// One product record.
    async fn fetch_product(&self, product_id: u64) -> ShopResult<Product>;

    /// The feature assignments of one product.
    async fn fetch_product_features(&self, product_id: u64)
        -> ShopResult<Vec<FeatureAssignment>>;

    /// One order, always live.
    async fn fetch_order(&self, order_id: u64) -> ShopResult<Order>;
}
