//! Order message formatting.
//!
//! Orders are fetched live for every request. The formatter extracts the
//! customer and order fields (with their named fallbacks), renders one
//! line per ordered product, and assembles a fixed multi-line message.
//! If the order cannot be retrieved it yields a fixed fallback phrase
//! instead of an error.

use std::sync::Arc;

use crate::domain::models::{Order, OrderInfo, OrderItem};
use crate::domain::ports::ShopApi;
use crate::infrastructure::config::OrdersConfig;

/// Returned when the order cannot be fetched or derived.
pub const ORDER_FALLBACK_MESSAGE: &str = "Could not retrieve the order.";

/// Product codes carry this prefix in front of the external identifier.
const EXTERNAL_CODE_PREFIX: &str = "px-";

/// Placeholder substituted in the configured product link template.
const LINK_ID_PLACEHOLDER: &str = "{id}";

pub struct OrderFormatter<S> {
    api: Arc<S>,
    config: OrdersConfig,
}

impl<S: ShopApi> OrderFormatter<S> {
    pub fn new(api: Arc<S>, config: OrdersConfig) -> Self {
        Self { api, config }
    }

    /// Fetch an order and render its message; never fails.
    pub async fn format_order(&self, order_id: u64) -> String {
        match self.api.fetch_order(order_id).await {
            Ok(order) => render_message(&build_order_info(&order, &self.config)),
            Err(e) => {
                tracing::warn!(order_id, error = %e, "order fetch failed");
                ORDER_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

/// Extract the derived view the message template renders.
pub fn build_order_info(order: &Order, config: &OrdersConfig) -> OrderInfo {
    let phone = order
        .phone
        .clone()
        .or_else(|| order.payment.as_ref().and_then(|p| p.phone.clone()))
        .unwrap_or_default();

    let contact_channel = if config.contact_field_id.is_empty() {
        String::new()
    } else {
        order
            .custom_fields
            .iter()
            .find(|field| field.id == config.contact_field_id)
            .and_then(|field| field.value.clone())
            .unwrap_or_default()
    };

    let customer_name = format!(
        "{} {}",
        order.first_name.as_deref().unwrap_or_default(),
        order.last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string();

    let total = match order.total {
        Some(total) => match &order.currency {
            Some(currency) => format!("{total} {currency}"),
            None => total.to_string(),
        },
        None => String::new(),
    };

    OrderInfo {
        id: order.id,
        total,
        phone,
        email: order.email.clone().unwrap_or_default(),
        contact_channel,
        customer_name,
        company: order.company.clone().unwrap_or_default(),
        note: order.note.clone().unwrap_or_default(),
        detail_url: format!(
            "{}/orders/{}",
            config.admin_url.trim_end_matches('/'),
            order.id
        ),
        payment_method: order
            .payment
            .as_ref()
            .and_then(|p| p.method.clone())
            .unwrap_or_default(),
        item_lines: order
            .items
            .iter()
            .map(|item| format_item_line(item, &config.product_link_template))
            .collect(),
    }
}

/// Render one ordered-product line.
///
/// `"{subtotal} {currency}"`, a `"({unit} x {qty})"` suffix only when the
/// quantity is above one, then the product name linked through the
/// configured template.
fn format_item_line(item: &OrderItem, link_template: &str) -> String {
    let quantity = f64::from(item.quantity);
    let subtotal = item
        .total_price
        .or_else(|| item.unit_price.map(|unit| unit * quantity))
        .unwrap_or_default();
    let currency = item.currency.as_deref().unwrap_or_default();

    let mut line = format!("{subtotal} {currency}").trim_end().to_string();
    if item.quantity > 1 {
        if let Some(unit) = item.unit_price {
            line.push_str(&format!(" ({unit} x {})", item.quantity));
        }
    }

    match &item.code {
        Some(code) => {
            let external_id = code.strip_prefix(EXTERNAL_CODE_PREFIX).unwrap_or(code);
            let url = link_template.replace(LINK_ID_PLACEHOLDER, external_id);
            line.push_str(&format!(" [{}]({url})", item.name));
        }
        None => {
            line.push_str(&format!(" {}", item.name));
        }
    }
    line
}

/// Assemble the fixed multi-line message.
fn render_message(info: &OrderInfo) -> String {
    let mut lines = vec![
        format!("Order #{}", info.id),
        format!("Customer: {}", info.customer_name),
        format!("Company: {}", info.company),
        format!("Email: {}", info.email),
        format!("Phone: {}", info.phone),
        format!("Contact channel: {}", info.contact_channel),
        format!("Payment: {}", info.payment_method),
        format!("Total: {}", info.total),
        format!("Note: {}", info.note),
        format!("Detail: {}", info.detail_url),
        "Items:".to_string(),
    ];
    lines.extend(info.item_lines.iter().cloned());
    lines.join("\n")
}
