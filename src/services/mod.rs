pub mod feature_catalog;
pub mod order_formatter;
pub mod product_catalog;
pub mod product_enricher;
pub mod variant_resolver;

#[cfg(test)]
pub mod test_support;

pub use feature_catalog::FeatureCatalogService;
pub use order_formatter::{OrderFormatter, ORDER_FALLBACK_MESSAGE};
pub use product_catalog::ProductCatalogService;
pub use product_enricher::ProductEnricher;
pub use variant_resolver::VariantResolver;
