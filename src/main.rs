//! Shopbridge CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use shopbridge::adapters::mcp::StdioServer;
use shopbridge::adapters::shop::ShopClient;
use shopbridge::infrastructure::cache::{CacheStore, VariantFileStore};
use shopbridge::infrastructure::{config::ConfigLoader, logging};
use shopbridge::services::{
    FeatureCatalogService, OrderFormatter, ProductCatalogService, ProductEnricher,
    VariantResolver,
};

#[derive(Parser, Debug)]
#[command(name = "shopbridge")]
#[command(about = "MCP tool server exposing a shop backend's catalog and orders", version)]
struct Args {
    /// Override the durable cache directory
    #[arg(long)]
    cache_dir: Option<String>,

    /// Override the log directory
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => {
            // logging is not up yet; configuration errors go to stderr
            eprintln!("configuration error: {err:#}");
            std::process::exit(1);
        }
    };
    if let Some(dir) = args.cache_dir {
        config.cache.dir = dir;
    }
    if let Some(dir) = args.log_dir {
        config.logging.dir = dir;
    }

    let _log_guard = logging::init(&config.logging)?;
    tracing::info!(
        shop_url = %config.shop.url,
        ttl_secs = config.cache.ttl_secs,
        "starting shopbridge"
    );

    let api = Arc::new(ShopClient::new(&config.shop)?);
    let cache_dir = PathBuf::from(&config.cache.dir);

    let resolver = Arc::new(VariantResolver::new(
        api.clone(),
        VariantFileStore::new(cache_dir.join("variants")),
    ));

    let mut feature_store = CacheStore::new(&cache_dir, "features");
    feature_store.load();
    let features = Arc::new(FeatureCatalogService::new(
        api.clone(),
        resolver,
        feature_store,
        config.cache.ttl_secs,
    ));

    let mut product_store = CacheStore::new(&cache_dir, "products");
    product_store.load();
    let products = Arc::new(ProductCatalogService::new(
        api.clone(),
        product_store,
        config.cache.ttl_secs,
    ));

    let enricher = Arc::new(ProductEnricher::new(api.clone(), features.clone()));
    let orders = Arc::new(OrderFormatter::new(api, config.orders.clone()));

    StdioServer::new(features, products, enricher, orders)
        .run()
        .await
}
