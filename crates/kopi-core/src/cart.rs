//! # Cart / Session Bridge
//!
//! The live editable cart and its bridge to hold orders.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart State Operations                              │
//! │                                                                         │
//! │  Cashier Action            Cart Change                                  │
//! │  ──────────────            ───────────                                  │
//! │  Tap product ────────────► add_item()      (same id → qty += n)         │
//! │  Tap [+] ────────────────► increase_qty()                               │
//! │  Tap [-] ────────────────► decrease_qty()  (floor 0 → line removed)     │
//! │  Remove line ────────────► remove_item()                                │
//! │  Edit notes ─────────────► update_notes()                               │
//! │                                                                         │
//! │  Park cart ──────────────► park()          (cart → HoldOrder snapshot)  │
//! │  Resume hold ────────────► load_hold()     (HoldOrder → cart, replaces  │
//! │                                             any unsaved contents)       │
//! │                                                                         │
//! │  All write operations go through CartState's Mutex.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Rule
//! `load_hold` is a deliberate last-write-wins replacement: whatever was in
//! the cart is discarded, no merge is attempted. The hold's id is kept as
//! `active_order_id` so a later park/save can tell a resumed order from a
//! fresh one.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CartItem, HoldOrder, OrderType};

// =============================================================================
// Cart
// =============================================================================

/// The editable cart for the active session.
///
/// ## Invariants
/// - Lines are unique by item id (adding the same product increments qty)
/// - Line qty is always positive; decreasing to zero removes the line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart lines, in entry order.
    pub items: Vec<CartItem>,

    /// Optional display label for the customer.
    pub customer_name: Option<String>,

    pub order_type: OrderType,

    /// Id of the hold this cart was resumed from, if any. Cleared on
    /// `clear()`; a fresh cart has none.
    pub active_order_id: Option<String>,

    /// When the cart was created or last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            customer_name: None,
            order_type: OrderType::default(),
            active_order_id: None,
            created_at: Utc::now(),
        }
    }

    /// Adds an item to the cart, or increments quantity if a line with the
    /// same id already exists (no duplicate lines per product).
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(line) = self.items.iter_mut().find(|l| l.id == item.id) {
            line.qty += item.qty;
            return;
        }
        self.items.push(item);
    }

    /// Increments a line's quantity by one. No-op if the line is absent.
    pub fn increase_qty(&mut self, item_id: &str) {
        if let Some(line) = self.items.iter_mut().find(|l| l.id == item_id) {
            line.qty += 1;
        }
    }

    /// Decrements a line's quantity by one, removing the line when it
    /// reaches zero. No-op if the line is absent.
    pub fn decrease_qty(&mut self, item_id: &str) {
        if let Some(line) = self.items.iter_mut().find(|l| l.id == item_id) {
            line.qty -= 1;
            if line.qty <= 0 {
                self.items.retain(|l| l.id != item_id);
            }
        }
    }

    /// Removes a line entirely, regardless of quantity.
    pub fn remove_item(&mut self, item_id: &str) {
        self.items.retain(|l| l.id != item_id);
    }

    /// Replaces a line's preparation notes. No-op if the line is absent.
    pub fn update_notes(&mut self, item_id: &str, notes: Option<String>) {
        if let Some(line) = self.items.iter_mut().find(|l| l.id == item_id) {
            line.notes = notes;
        }
    }

    /// Subtotal (sum of price × qty) in whole Rupiah. Pure, no side effects.
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.qty).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears the cart back to a fresh session.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer_name = None;
        self.order_type = OrderType::default();
        self.active_order_id = None;
        self.created_at = Utc::now();
    }

    // =========================================================================
    // Hold Order Bridge
    // =========================================================================

    /// Rehydrates the cart from a resumed hold order.
    ///
    /// Fully overwrites any unsaved cart contents (last-write-wins, no
    /// merge). Tags the cart with the hold's id as `active_order_id`.
    pub fn load_hold(&mut self, hold: &HoldOrder) {
        self.items = hold.items.clone();
        self.customer_name = hold.customer_name.clone();
        self.order_type = hold.order_type;
        self.active_order_id = Some(hold.id.clone());
    }

    /// Snapshots the cart into a [`HoldOrder`] with the given id.
    ///
    /// The cart itself is untouched; the caller clears it after the hold
    /// has been durably persisted.
    pub fn park(&self, hold_id: impl Into<String>) -> HoldOrder {
        HoldOrder {
            id: hold_id.into(),
            items: self.items.clone(),
            customer_name: self.customer_name.clone(),
            order_type: self.order_type,
            created_at: Utc::now(),
            merged_from: None,
            split_from: None,
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Explicit owner object for the active cart.
///
/// ## Thread Safety
/// `Arc<Mutex<Cart>>` because multiple handlers may touch the cart but only
/// one may modify it at a time. No ambient global: the host application
/// constructs one of these and passes it where needed.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryType;

    fn item(id: &str, price: i64, qty: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            qty,
            price,
            category_type: CategoryType::Drink,
            notes: None,
        }
    }

    #[test]
    fn test_add_same_item_increments_qty() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 18000, 1));
        cart.add_item(item("p1", 18000, 2));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].qty, 3);
        assert_eq!(cart.subtotal(), 54000);
    }

    #[test]
    fn test_decrease_qty_floors_at_zero_and_removes() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 10000, 1));

        cart.decrease_qty("p1");
        assert!(cart.is_empty());

        // Decreasing an absent line is a no-op, not a panic.
        cart.decrease_qty("p1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_notes() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 10000, 1));
        cart.update_notes("p1", Some("no ice".into()));
        assert_eq!(cart.items[0].notes.as_deref(), Some("no ice"));
    }

    #[test]
    fn test_load_hold_replaces_cart_contents() {
        let mut cart = Cart::new();
        cart.add_item(item("unsaved", 99999, 9));

        let hold = HoldOrder {
            id: "hold-7".into(),
            items: vec![item("p2", 15000, 2)],
            customer_name: Some("Sari".into()),
            order_type: OrderType::TakeAway,
            created_at: Utc::now(),
            merged_from: None,
            split_from: None,
        };

        cart.load_hold(&hold);

        // Last-write-wins: the unsaved line is gone.
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].id, "p2");
        assert_eq!(cart.customer_name.as_deref(), Some("Sari"));
        assert_eq!(cart.order_type, OrderType::TakeAway);
        assert_eq!(cart.active_order_id.as_deref(), Some("hold-7"));
    }

    #[test]
    fn test_park_snapshots_cart() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", 20000, 1));
        cart.customer_name = Some("Budi".into());

        let hold = cart.park("hold-1");
        assert_eq!(hold.id, "hold-1");
        assert_eq!(hold.items, cart.items);
        assert!(hold.merged_from.is_none());
        assert!(hold.split_from.is_none());

        // Parking does not consume the cart.
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_cart_state_accessors() {
        let state = CartState::new();
        state.with_cart_mut(|cart| cart.add_item(item("p1", 12000, 2)));
        let subtotal = state.with_cart(|cart| cart.subtotal());
        assert_eq!(subtotal, 24000);
    }
}
