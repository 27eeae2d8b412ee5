//! MCP stdio server implementing JSON-RPC 2.0 over stdin/stdout.
//!
//! Exposes the shop catalog and order operations as tools via the MCP
//! (Model Context Protocol).
//!
//! Protocol: newline-delimited JSON-RPC 2.0 on stdin/stdout.
//! Logging goes to the log file and stderr (stdout is reserved for
//! protocol messages). Every tool failure is returned as an error-flagged
//! text result, never as a transport-level failure.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::domain::ports::ShopApi;
use crate::services::{
    FeatureCatalogService, OrderFormatter, ProductCatalogService, ProductEnricher,
};

/// MCP stdio server exposing the shop tools.
pub struct StdioServer<S: ShopApi> {
    features: Arc<FeatureCatalogService<S>>,
    products: Arc<ProductCatalogService<S>>,
    enricher: Arc<ProductEnricher<S>>,
    orders: Arc<OrderFormatter<S>>,
}

impl<S: ShopApi> StdioServer<S> {
    pub fn new(
        features: Arc<FeatureCatalogService<S>>,
        products: Arc<ProductCatalogService<S>>,
        enricher: Arc<ProductEnricher<S>>,
        orders: Arc<OrderFormatter<S>>,
    ) -> Self {
        Self {
            features,
            products,
            enricher,
            orders,
        }
    }

    /// Run the stdio server loop, reading JSON-RPC from stdin and writing
    /// responses to stdout.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        tracing::info!("stdio server started");

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_message(&line).await;
            if response.is_empty() {
                continue;
            }
            let mut response_bytes = response.into_bytes();
            response_bytes.push(b'\n');
            stdout.write_all(&response_bytes).await?;
            stdout.flush().await?;
        }

        tracing::info!("stdio server stopped");
        Ok(())
    }

    async fn handle_message(&self, line: &str) -> String {
        let request: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return error_response(
                    serde_json::Value::Null,
                    -32700,
                    &format!("Parse error: {e}"),
                );
            }
        };

        let id = request.get("id").cloned().unwrap_or(serde_json::Value::Null);
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request
            .get("params")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match method {
            "initialize" => handle_initialize(id),
            "tools/list" => handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, &params).await,
            // Client notification, no response required.
            "notifications/initialized" => String::new(),
            _ => error_response(id, -32601, &format!("Method not found: {method}")),
        }
    }

    async fn handle_tools_call(&self, id: serde_json::Value, params: &serde_json::Value) -> String {
        let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        tracing::debug!(tool = tool_name, "tool call");

        let result = match tool_name {
            "get-product" => self.tool_get_product(&arguments).await,
            "get-products" => self.tool_get_products().await,
            "get-features" => self.tool_get_features().await,
            "search-products" => self.tool_search_products(&arguments).await,
            "get-order" => self.tool_get_order(&arguments).await,
            _ => Err(format!("Unknown tool: {tool_name}")),
        };

        match result {
            Ok(content) => {
                let result = serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": content
                    }]
                });
                success_response(id, result)
            }
            Err(error) => {
                tracing::warn!(tool = tool_name, error = %error, "tool call failed");
                let result = serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": error
                    }],
                    "isError": true
                });
                success_response(id, result)
            }
        }
    }

    // ========================================================================
    // Tools
    // ========================================================================

    async fn tool_get_product(&self, args: &serde_json::Value) -> Result<String, String> {
        let product_id = positive_id(args, "productId")?;
        let enriched = self
            .enricher
            .enrich(product_id)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&enriched).map_err(|e| e.to_string())
    }

    async fn tool_get_products(&self) -> Result<String, String> {
        let products = self.products.all().await.map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&products).map_err(|e| e.to_string())
    }

    async fn tool_get_features(&self) -> Result<String, String> {
        let catalog = self.features.catalog().await.map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&catalog).map_err(|e| e.to_string())
    }

    async fn tool_search_products(&self, args: &serde_json::Value) -> Result<String, String> {
        let name = args.get("name").and_then(|v| v.as_str());
        let code = args.get("code").and_then(|v| v.as_str());
        let found = self
            .products
            .search(name, code)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string_pretty(&found).map_err(|e| e.to_string())
    }

    async fn tool_get_order(&self, args: &serde_json::Value) -> Result<String, String> {
        let order_id = positive_id(args, "orderId")?;
        // never fails; unfetchable orders render the fallback message
        Ok(self.orders.format_order(order_id).await)
    }
}

/// Extract a required positive integer argument.
fn positive_id(args: &serde_json::Value, key: &str) -> Result<u64, String> {
    args.get(key)
        .and_then(serde_json::Value::as_u64)
        .filter(|id| *id > 0)
        .ok_or_else(|| format!("Missing or invalid `{key}`: expected a positive integer"))
}

fn handle_initialize(id: serde_json::Value) -> String {
    let result = serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "shopbridge",
            "version": env!("CARGO_PKG_VERSION")
        }
    });
    success_response(id, result)
}

fn handle_tools_list(id: serde_json::Value) -> String {
    let tools = serde_json::json!({
        "tools": [
            {
                "name": "get-product",
                "description": "Get one product by id, enriched with its resolved feature values. Feature assignments are joined against the feature catalog client-side, so variant references come back as human-readable labels, numeric features as numbers, and multi-select features as label lists.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "productId": { "type": "integer", "description": "Product id (positive integer)" }
                    },
                    "required": ["productId"]
                }
            },
            {
                "name": "get-products",
                "description": "List every product with its complete backend record. The catalog is drained page by page and cached; within the configured TTL repeated calls are served from the cache.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "get-features",
                "description": "List every feature definition enriched with its variant set. Use this to learn which attributes exist and which values they permit.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "search-products",
                "description": "Search products by name and/or product code (case-insensitive substring match; both filters must match when both are given). Returns trimmed product summaries.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Substring to match against product names" },
                        "code": { "type": "string", "description": "Substring to match against product codes" }
                    }
                }
            },
            {
                "name": "get-order",
                "description": "Get one order by id as a formatted message: customer contact fields, payment, total, an admin detail link, and one line per ordered product. Orders are always fetched live, never cached.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "orderId": { "type": "integer", "description": "Order id (positive integer)" }
                    },
                    "required": ["orderId"]
                }
            }
        ]
    });
    success_response(id, tools)
}

// ========================================================================
// JSON-RPC helpers
// ========================================================================

fn success_response(id: serde_json::Value, result: serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
    .to_string()
}

fn error_response(id: serde_json::Value, code: i32, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
    .to_string()
}
