pub mod feature;
pub mod order;
pub mod product;

pub use feature::{Feature, FeatureRecord, FeatureType, Variant, VariantSet};
pub use order::{CustomField, Order, OrderInfo, OrderItem, PaymentInfo};
pub use product::{EnrichedProduct, FeatureAssignment, FeatureValue, Product, ProductSummary};
