//! # Domain Types
//!
//! Core domain types used throughout Kopi POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderItem     │   │   HoldOrder     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  total, paid    │   │  qty, price     │   │  items          │       │
//! │  │  is_synced      │   │  is_done        │   │  merged_from    │       │
//! │  │  status         │   │  category_type  │   │  split_from     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │   OrderType     │   │  OrderStatus    │       │
//! │  │  CASH DANA      │   │  Dine In        │   │  PENDING → ...  │       │
//! │  │  BCA  QRIS      │   │  Take Away      │   │  → COMPLETED    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Monetary Amounts
//! All amounts are whole Rupiah stored as `i64`. There is no fractional
//! currency unit in play, so no decimal/cents scaling is needed.
//!
//! ## Wire Spellings
//! The serde spellings ("CASH", "Dine In", "FOOD", "PENDING") are the
//! canonical wire and database forms; the enums are the only place those
//! strings are defined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Payment Method
// =============================================================================

/// Accepted payment methods. Closed set; remote records carrying anything
/// else are rejected at the normalization boundary.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// DANA e-wallet.
    Dana,
    /// BCA bank transfer.
    Bca,
    /// QRIS standard QR payment.
    Qris,
}

impl PaymentMethod {
    /// Parses a payment method label, tolerating any input casing.
    ///
    /// Remote systems have been observed sending `"cash"` as well as
    /// `"CASH"`; both normalize to [`PaymentMethod::Cash`].
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CASH" => Some(PaymentMethod::Cash),
            "DANA" => Some(PaymentMethod::Dana),
            "BCA" => Some(PaymentMethod::Bca),
            "QRIS" => Some(PaymentMethod::Qris),
            _ => None,
        }
    }

    /// Canonical uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Dana => "DANA",
            PaymentMethod::Bca => "BCA",
            PaymentMethod::Qris => "QRIS",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// How the order is served.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderType {
    #[serde(rename = "Dine In")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Dine In"))]
    DineIn,
    #[serde(rename = "Take Away")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Take Away"))]
    TakeAway,
}

impl OrderType {
    /// Parses an order type label, tolerating casing and underscores.
    pub fn parse(label: &str) -> Option<Self> {
        match label
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .as_str()
        {
            "dine in" | "dinein" => Some(OrderType::DineIn),
            "take away" | "takeaway" => Some(OrderType::TakeAway),
            _ => None,
        }
    }

    /// Canonical display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine In",
            OrderType::TakeAway => "Take Away",
        }
    }
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Kitchen/front-of-house progression of a finalized order.
///
/// Status is the only order field (besides `is_synced` and per-item
/// `is_done`) that is mutable after checkout.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Just checked out, not yet picked up by the kitchen.
    Pending,
    /// Kitchen is working on it.
    Preparing,
    /// Ready for pickup/serving.
    Ready,
    /// Served and done.
    Completed,
    /// Cancelled (administrative).
    Cancelled,
}

impl OrderStatus {
    /// Parses a status label, tolerating any input casing.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "PREPARING" => Some(OrderStatus::Preparing),
            "READY" => Some(OrderStatus::Ready),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Canonical uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Category Type
// =============================================================================

/// Menu category for kitchen routing (food vs. drink station).
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    Food,
    Drink,
}

impl CategoryType {
    /// Parses a category label, tolerating any input casing.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "FOOD" => Some(CategoryType::Food),
            "DRINK" => Some(CategoryType::Drink),
            _ => None,
        }
    }

    /// Canonical uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Food => "FOOD",
            CategoryType::Drink => "DRINK",
        }
    }
}

impl Default for CategoryType {
    fn default() -> Self {
        CategoryType::Food
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in a finalized order.
///
/// Item order within `Order::items` is entry order and is preserved end to
/// end (store, sync, receipt rendering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Item id (usually the product id; `item-legacy-{index}` when a remote
    /// record arrived without one).
    pub id: String,

    /// Display name shown on tickets and receipts.
    pub name: String,

    /// Quantity sold. Always positive.
    pub qty: i64,

    /// Unit price in whole Rupiah. Never negative.
    pub price: i64,

    /// Kitchen routing category.
    pub category_type: CategoryType,

    /// Free-form preparation notes ("less sugar", "no ice").
    pub notes: Option<String>,

    /// Kitchen-display completion flag.
    pub is_done: bool,
}

impl OrderItem {
    /// Line total (unit price × quantity) in whole Rupiah.
    #[inline]
    pub fn line_total(&self) -> i64 {
        self.price * self.qty
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// An item in an editable cart or a hold order.
///
/// Same shape as [`OrderItem`] minus the kitchen `is_done` flag, which only
/// exists once an order is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id. Cart lines are keyed by this.
    pub id: String,

    /// Display name at time of adding.
    pub name: String,

    /// Quantity in cart. Always positive while the line exists.
    pub qty: i64,

    /// Unit price in whole Rupiah at time of adding.
    pub price: i64,

    /// Kitchen routing category.
    pub category_type: CategoryType,

    /// Free-form preparation notes.
    pub notes: Option<String>,
}

impl CartItem {
    /// Line total (unit price × quantity) in whole Rupiah.
    #[inline]
    pub fn line_total(&self) -> i64 {
        self.price * self.qty
    }
}

impl From<CartItem> for OrderItem {
    fn from(item: CartItem) -> Self {
        OrderItem {
            id: item.id,
            name: item.name,
            qty: item.qty,
            price: item.price,
            category_type: item.category_type,
            notes: item.notes,
            is_done: false,
        }
    }
}

impl From<OrderItem> for CartItem {
    fn from(item: OrderItem) -> Self {
        CartItem {
            id: item.id,
            name: item.name,
            qty: item.qty,
            price: item.price,
            category_type: item.category_type,
            notes: item.notes,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A finalized transaction. Immutable once persisted except for `status`,
/// per-item `is_done`, and `is_synced`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Globally unique id (time prefix + random suffix, see [`crate::new_id`]).
    pub id: String,

    /// Checkout time. Serialized as an ISO-8601 string for store portability.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Grand total in whole Rupiah. Never negative.
    pub total: i64,

    /// Amount tendered in whole Rupiah. Never negative.
    pub paid: i64,

    pub payment_method: PaymentMethod,

    pub order_type: OrderType,

    /// Optional display label ("Budi", "Table 4").
    pub customer_name: Option<String>,

    /// Line items, in entry order. Never empty for a persisted order.
    pub items: Vec<OrderItem>,

    /// True only after the remote store has acknowledged this order.
    /// Monotonic client-side; a cloud upsert always writes it as true.
    pub is_synced: bool,

    pub status: OrderStatus,
}

// =============================================================================
// Hold Order
// =============================================================================

/// A cashier-parked, not-yet-finalized cart, durably stored for later
/// resumption.
///
/// ## Lineage
/// `merged_from` / `split_from` record which hold(s) this one was produced
/// from, forming an audit forest. A hold created directly from a cart has
/// neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HoldOrder {
    /// Unique hold id.
    pub id: String,

    /// Parked cart items, in entry order.
    pub items: Vec<CartItem>,

    /// Optional display label.
    pub customer_name: Option<String>,

    pub order_type: OrderType,

    /// When the cart was parked (or the merge/split happened).
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Source hold ids, present only on merge results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<Vec<String>>,

    /// Source hold id, present only on split results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_from: Option<String>,
}

impl HoldOrder {
    /// Subtotal of the parked items in whole Rupiah.
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse_any_case() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("QRIS"), Some(PaymentMethod::Qris));
        assert_eq!(PaymentMethod::parse(" dana "), Some(PaymentMethod::Dana));
        assert_eq!(PaymentMethod::parse("visa"), None);
    }

    #[test]
    fn test_payment_method_wire_spelling() {
        let json = serde_json::to_string(&PaymentMethod::Cash).unwrap();
        assert_eq!(json, "\"CASH\"");
    }

    #[test]
    fn test_order_type_parse() {
        assert_eq!(OrderType::parse("Dine In"), Some(OrderType::DineIn));
        assert_eq!(OrderType::parse("dine_in"), Some(OrderType::DineIn));
        assert_eq!(OrderType::parse("takeaway"), Some(OrderType::TakeAway));
        assert_eq!(OrderType::parse("delivery"), None);
    }

    #[test]
    fn test_order_type_wire_spelling() {
        let json = serde_json::to_string(&OrderType::TakeAway).unwrap();
        assert_eq!(json, "\"Take Away\"");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_category_default_is_food() {
        assert_eq!(CategoryType::default(), CategoryType::Food);
    }

    #[test]
    fn test_cart_item_round_trips_to_order_item() {
        let cart_item = CartItem {
            id: "prod-1".into(),
            name: "Es Kopi Susu".into(),
            qty: 2,
            price: 18000,
            category_type: CategoryType::Drink,
            notes: Some("less sugar".into()),
        };

        let order_item: OrderItem = cart_item.clone().into();
        assert!(!order_item.is_done);
        assert_eq!(order_item.line_total(), 36000);

        let back: CartItem = order_item.into();
        assert_eq!(back, cart_item);
    }
}
