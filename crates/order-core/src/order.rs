//! # Order Summary & Submission
//!
//! Derived order data: the summary lines and totals shown next to the
//! viewer, and the snapshot produced when the user presses PAY.
//!
//! ## Summary Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog (all products)                                                 │
//! │       │ filter quantity > 0, keep catalog order                         │
//! │       ▼                                                                 │
//! │  OrderLine { name, quantity, line_total = quantity × price }            │
//! │       │ sum                                                             │
//! │       ▼                                                                 │
//! │  subtotal ──► vat = subtotal × 12% ──► total = subtotal + vat           │
//! │                                                                         │
//! │  Nothing is rounded here. Rounding to cents is a display concern.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::{DeliveryChoice, Product, TaxRate};

// =============================================================================
// Summary
// =============================================================================

/// One active product in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    #[ts(type = "string")]
    pub unit_price: Money,
    #[ts(type = "string")]
    pub line_total: Money,
}

impl OrderLine {
    pub fn from_product(product: &Product) -> Self {
        OrderLine {
            product_id: product.id().to_string(),
            name: product.name().to_string(),
            quantity: product.quantity(),
            unit_price: product.price(),
            line_total: product.line_total(),
        }
    }
}

/// Lines and exact totals for the current quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub vat: Money,
    #[ts(type = "string")]
    pub total: Money,
}

impl OrderSummary {
    /// Builds the summary from products, keeping only active ones in the
    /// order given.
    ///
    /// ## Example
    /// ```rust
    /// use order_core::money::Money;
    /// use order_core::order::OrderSummary;
    /// use order_core::types::Product;
    /// use order_core::VAT_RATE;
    ///
    /// let mug = Product::new("p1", "Mug", Money::from_cents(1599)).with_quantity(2);
    /// let summary = OrderSummary::from_products([&mug], VAT_RATE);
    /// assert_eq!(summary.subtotal.to_decimal_string(), "31.98");
    /// assert_eq!(summary.vat.to_decimal_string(), "3.8376");
    /// assert_eq!(summary.total.to_decimal_string(), "35.8176");
    /// ```
    pub fn from_products<'a, I>(products: I, rate: TaxRate) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let lines: Vec<OrderLine> = products
            .into_iter()
            .filter(|p| p.is_active())
            .map(OrderLine::from_product)
            .collect();

        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
        let vat = subtotal.calculate_tax(rate);

        OrderSummary {
            lines,
            subtotal,
            vat,
            total: subtotal + vat,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

// =============================================================================
// Submission
// =============================================================================

/// A locally finalized order. Nothing is sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmittedOrder {
    #[ts(as = "String")]
    pub reference: Uuid,
    #[ts(as = "String")]
    pub submitted_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub vat: Money,
    #[ts(type = "string")]
    pub total: Money,
    pub delivery: Option<DeliveryChoice>,
}

impl SubmittedOrder {
    /// Snapshots a non-empty summary with a fresh reference and timestamp.
    pub fn from_summary(summary: OrderSummary, delivery: Option<DeliveryChoice>) -> Self {
        SubmittedOrder {
            reference: Uuid::new_v4(),
            submitted_at: Utc::now(),
            lines: summary.lines,
            subtotal: summary.subtotal,
            vat: summary.vat,
            total: summary.total,
            delivery,
        }
    }
}

/// Outcome of pressing PAY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export)]
pub enum OrderResult {
    /// No product had a positive quantity.
    Empty,
    Submitted(SubmittedOrder),
}

impl OrderResult {
    pub fn is_submitted(&self) -> bool {
        matches!(self, OrderResult::Submitted(_))
    }

    pub fn submitted(&self) -> Option<&SubmittedOrder> {
        match self {
            OrderResult::Submitted(order) => Some(order),
            OrderResult::Empty => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VAT_RATE;

    fn product(id: &str, cents: i64, qty: u32) -> Product {
        Product::new(id, id.to_uppercase(), Money::from_cents(cents)).with_quantity(qty)
    }

    #[test]
    fn test_order_result_binding_is_tagged() {
        let ts = <OrderResult as TS>::inline();
        assert!(ts.contains("status"));
        assert!(ts.contains("\"empty\""));
        assert!(ts.contains("\"submitted\""));

        let json = serde_json::to_value(OrderResult::Empty).unwrap();
        assert_eq!(json, serde_json::json!({"status": "empty"}));
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = OrderSummary::from_products(&[] as &[Product], VAT_RATE);
        assert!(summary.is_empty());
        assert_eq!(summary.subtotal, Money::zero());
        assert_eq!(summary.vat, Money::zero());
        assert_eq!(summary.total, Money::zero());
    }

    #[test]
    fn test_summary_skips_inactive_and_keeps_order() {
        let products = [product("a", 100, 0), product("b", 250, 3), product("c", 999, 1)];
        let summary = OrderSummary::from_products(&products, VAT_RATE);

        let ids: Vec<&str> = summary.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(summary.lines[0].line_total, Money::from_cents(750));
        assert_eq!(summary.subtotal, Money::from_cents(1749));
        assert_eq!(summary.item_count(), 4);
    }

    #[test]
    fn test_total_is_subtotal_plus_vat() {
        for cents in [0, 1, 99, 1599, 3198, 123_457] {
            let products = [product("x", cents, 1)];
            let summary = OrderSummary::from_products(&products, VAT_RATE);
            assert_eq!(summary.total, summary.subtotal + summary.vat);
            assert_eq!(summary.vat.raw(), summary.subtotal.raw() * 12 / 100);
        }
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let empty = serde_json::to_value(OrderResult::Empty).unwrap();
        assert_eq!(empty["status"], "empty");

        let products = [product("a", 100, 1)];
        let summary = OrderSummary::from_products(&products, VAT_RATE);
        let result = OrderResult::Submitted(SubmittedOrder::from_summary(
            summary,
            Some(DeliveryChoice::Yes),
        ));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["delivery"], "yes");
        assert_eq!(json["total"], "1.12");
    }
}
