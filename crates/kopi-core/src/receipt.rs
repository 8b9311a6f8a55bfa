//! # Checkout & Receipt Snapshot
//!
//! Finalization of a cart into an immutable [`Order`] plus a print-ready
//! [`ReceiptSnapshot`].
//!
//! The receipt is a derived, one-way artifact: it is generated exactly once
//! at checkout for print rendering and is never fed back into the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::id::new_id;
use crate::types::{Order, OrderItem, OrderStatus, PaymentMethod};
use crate::validation::validate_order;
use crate::ORDER_ID_PREFIX;

// =============================================================================
// Receipt Snapshot
// =============================================================================

/// Immutable print-ready artifact generated once at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSnapshot {
    /// Id of the order this receipt was printed for.
    pub order_id: String,

    /// Line items exactly as they appear on the order, in entry order.
    pub items: Vec<OrderItem>,

    /// Sum of line totals, whole Rupiah.
    pub subtotal: i64,

    /// Tax amount, whole Rupiah (supplied by the caller).
    pub tax: i64,

    /// Service charge, whole Rupiah (supplied by the caller).
    pub service_charge: i64,

    /// Grand total: subtotal + tax + service_charge.
    pub total: i64,

    /// Amount tendered.
    pub paid: i64,

    /// Change returned: paid - total.
    pub change: i64,

    pub payment_method: PaymentMethod,

    /// Display label, "Dine In" / "Take Away".
    pub order_type: String,

    /// Name of the cashier who rang up the sale.
    pub cashier_name: String,

    /// When the receipt was issued.
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

// =============================================================================
// Checkout
// =============================================================================

/// Inputs to cart finalization that the cart itself cannot know.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,

    /// Amount tendered, whole Rupiah. Must cover the grand total.
    pub paid: i64,

    /// Tax amount, whole Rupiah. Computed by the (out-of-scope) pricing
    /// layer and passed in.
    pub tax: i64,

    /// Service charge, whole Rupiah.
    pub service_charge: i64,

    pub cashier_name: String,
}

/// The result of finalizing a cart: the durable order record and its
/// one-shot receipt.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub order: Order,
    pub receipt: ReceiptSnapshot,
}

impl Cart {
    /// Finalizes the cart into an [`Order`] plus [`ReceiptSnapshot`].
    ///
    /// The order id is freshly minted (`order-` prefix); a cart resumed
    /// from a hold does NOT reuse the hold's id, since an order and a hold
    /// live in different collections with different lifecycles.
    ///
    /// The cart is not mutated; the caller clears it after the order has
    /// been durably persisted.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] — a cart becomes an order only at
    ///   checkout, with at least one line
    /// - [`CoreError::InsufficientPayment`] — `paid` below the grand total
    pub fn finalize(&self, request: CheckoutRequest) -> CoreResult<Checkout> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let subtotal = self.subtotal();
        let total = subtotal + request.tax + request.service_charge;
        if request.paid < total {
            return Err(CoreError::InsufficientPayment {
                total,
                paid: request.paid,
            });
        }

        let items: Vec<OrderItem> = self.items.iter().cloned().map(OrderItem::from).collect();
        let now = Utc::now();

        let order = Order {
            id: new_id(ORDER_ID_PREFIX),
            created_at: now,
            total,
            paid: request.paid,
            payment_method: request.payment_method,
            order_type: self.order_type,
            customer_name: self.customer_name.clone(),
            items: items.clone(),
            is_synced: false,
            status: OrderStatus::Pending,
        };
        validate_order(&order)?;

        let receipt = ReceiptSnapshot {
            order_id: order.id.clone(),
            items,
            subtotal,
            tax: request.tax,
            service_charge: request.service_charge,
            total,
            paid: request.paid,
            change: request.paid - total,
            payment_method: request.payment_method,
            order_type: self.order_type.to_string(),
            cashier_name: request.cashier_name,
            issued_at: now,
        };

        Ok(Checkout { order, receipt })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartItem, CategoryType};

    fn cart_with_one_line() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            id: "prod-1".into(),
            name: "Es Kopi Susu".into(),
            qty: 2,
            price: 18000,
            category_type: CategoryType::Drink,
            notes: None,
        });
        cart.customer_name = Some("Budi".into());
        cart
    }

    fn request(paid: i64) -> CheckoutRequest {
        CheckoutRequest {
            payment_method: PaymentMethod::Qris,
            paid,
            tax: 3600,
            service_charge: 0,
            cashier_name: "Ani".into(),
        }
    }

    #[test]
    fn test_finalize_produces_order_and_receipt() {
        let cart = cart_with_one_line();
        let checkout = cart.finalize(request(40000)).unwrap();

        assert!(checkout.order.id.starts_with("order-"));
        assert_eq!(checkout.order.total, 39600); // 36000 + 3600 tax
        assert!(!checkout.order.is_synced);
        assert_eq!(checkout.order.status, OrderStatus::Pending);

        assert_eq!(checkout.receipt.order_id, checkout.order.id);
        assert_eq!(checkout.receipt.subtotal, 36000);
        assert_eq!(checkout.receipt.change, 400);
        assert_eq!(checkout.receipt.order_type, "Dine In");
    }

    #[test]
    fn test_finalize_empty_cart_fails() {
        let cart = Cart::new();
        assert!(matches!(
            cart.finalize(request(100000)),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_finalize_underpayment_fails() {
        let cart = cart_with_one_line();
        assert!(matches!(
            cart.finalize(request(10000)),
            Err(CoreError::InsufficientPayment { .. })
        ));
    }
}
