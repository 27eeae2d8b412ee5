//! Shopbridge - caching MCP tool server for an e-commerce backend
//!
//! Shopbridge exposes a shop backend's catalog and order data as a small
//! set of MCP tools. The backend is a slow, rate-limited, paginated REST
//! API; this crate turns it into consistently-shaped, quickly-retrievable
//! product, feature, and order objects via a two-level cache (in-memory +
//! on-disk) with independent expiry per resource type, pagination
//! draining, and a client-side feature/variant-resolution join.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): errors, typed models, and the `ShopApi`
//!   port the services depend on
//! - **Service Layer** (`services`): catalog refreshers, variant
//!   resolution, product enrichment, order formatting
//! - **Adapters** (`adapters`): the backend HTTP client and the MCP
//!   stdio server
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging,
//!   durable cache stores

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ShopError, ShopResult};
pub use domain::models::{
    EnrichedProduct, Feature, FeatureType, FeatureValue, Order, Product, ProductSummary, Variant,
    VariantSet,
};
pub use domain::ports::ShopApi;
pub use infrastructure::config::{Config, ConfigError, ConfigLoader};
