//! End-to-end cache behavior: a drained catalog persists to disk and a
//! fresh process (new client + services over the same cache directory)
//! serves it without touching the backend.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;

use shopbridge::adapters::shop::ShopClient;
use shopbridge::infrastructure::cache::{CacheStore, VariantFileStore};
use shopbridge::infrastructure::config::ShopConfig;
use shopbridge::services::{FeatureCatalogService, ProductCatalogService, VariantResolver};

fn client_for(server: &ServerGuard) -> Arc<ShopClient> {
    Arc::new(
        ShopClient::new(&ShopConfig {
            url: server.url(),
            email: "api@example.com".to_string(),
            api_key: "secret".to_string(),
            page_size: 250,
        })
        .unwrap(),
    )
}

fn product_service(api: Arc<ShopClient>, dir: &TempDir) -> ProductCatalogService<ShopClient> {
    let mut store = CacheStore::new(dir.path(), "products");
    store.load();
    ProductCatalogService::new(api, store, 3600)
}

fn feature_service(api: Arc<ShopClient>, dir: &TempDir) -> FeatureCatalogService<ShopClient> {
    let resolver = Arc::new(VariantResolver::new(
        api.clone(),
        VariantFileStore::new(dir.path().join("variants")),
    ));
    let mut store = CacheStore::new(dir.path(), "features");
    store.load();
    FeatureCatalogService::new(api, resolver, store, 3600)
}

#[tokio::test]
async fn test_product_catalog_survives_a_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/products")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "products": [ { "id": 1, "name": "Widget" } ] }"#)
            .expect(1)
            .create_async()
            .await;

        let service = product_service(client_for(&server), &dir);
        assert_eq!(service.all().await.unwrap().len(), 1);
        mock.assert_async().await;
    }

    // fresh services over the same cache dir; the server has no mocks and
    // any request would fail, so the catalog must come from disk
    let server = Server::new_async().await;
    let service = product_service(client_for(&server), &dir);
    let products = service.all().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Widget");
}

#[tokio::test]
async fn test_feature_catalog_restart_reuses_blob_and_variant_files() {
    let dir = TempDir::new().unwrap();

    {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v2/features")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{ "features": [ { "id": 12, "description": "Color", "feature_type": "M" } ] }"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/v2/features/12/variants")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "variants": [ { "id": 7, "label": "Red" } ] }"#)
            .expect(1)
            .create_async()
            .await;

        let service = feature_service(client_for(&server), &dir);
        let catalog = service.catalog().await.unwrap();
        assert_eq!(catalog[0].variants.find_label(7), Some("Red"));
    }

    assert!(dir.path().join("features.json").exists());
    assert!(dir.path().join("variants").join("12.json").exists());

    let server = Server::new_async().await;
    let service = feature_service(client_for(&server), &dir);
    let catalog = service.catalog().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].variants.find_label(7), Some("Red"));
}
