//! In-memory [`ShopApi`] fake shared by the service unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::errors::{ShopError, ShopResult};
use crate::domain::models::{FeatureAssignment, FeatureRecord, Order, Product, Variant};
use crate::domain::ports::ShopApi;

/// Canned backend with per-resource failure switches and call counters.
#[derive(Default)]
pub struct MockShop {
    pub features: Vec<FeatureRecord>,
    pub variants: HashMap<u64, Vec<Variant>>,
    pub products: Vec<Product>,
    pub product_features: Vec<FeatureAssignment>,
    pub orders: HashMap<u64, Order>,

    pub fail_features: bool,
    pub fail_variants: bool,
    pub fail_products: bool,
    pub fail_product: bool,
    pub fail_product_features: bool,

    pub feature_calls: AtomicUsize,
    pub variant_calls: AtomicUsize,
    pub product_calls: AtomicUsize,
}

fn mock_failure(resource: &'static str) -> ShopError {
    ShopError::backend(resource, 500, "mock failure".to_string())
}

impl MockShop {
    /// Parse a product from raw JSON; panics on malformed test data.
    pub fn product_from_json(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }
}

#[async_trait]
impl ShopApi for MockShop {
    async fn fetch_features(&self) -> ShopResult<Vec<FeatureRecord>> {
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_features {
            return Err(mock_failure("features"));
        }
        Ok(self.features.clone())
    }

    async fn fetch_feature_variants(&self, feature_id: u64) -> ShopResult<Vec<Variant>> {
        self.variant_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_variants {
            return Err(mock_failure("feature variants"));
        }
        Ok(self.variants.get(&feature_id).cloned().unwrap_or_default())
    }

    async fn fetch_products(&self) -> ShopResult<Vec<Product>> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_products {
            return Err(mock_failure("products"));
        }
        Ok(self.products.clone())
    }

    async fn fetch_product(&self, product_id: u64) -> ShopResult<Product> {
        if self.fail_product {
            return Err(mock_failure("product"));
        }
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| ShopError::backend("product", 404, "not found".to_string()))
    }

    async fn fetch_product_features(
        &self,
        _product_id: u64,
    ) -> ShopResult<Vec<FeatureAssignment>> {
        if self.fail_product_features {
            return Err(mock_failure("product features"));
        }
        Ok(self.product_features.clone())
    }

    async fn fetch_order(&self, order_id: u64) -> ShopResult<Order> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ShopError::backend("order", 404, "not found".to_string()))
    }
}
