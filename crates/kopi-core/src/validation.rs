//! # Validation Module
//!
//! Whole-record and field validation for orders and hold orders.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Type system                                                   │
//! │  ├── Closed enums (PaymentMethod, OrderStatus, ...)                     │
//! │  └── Deserialization rejects unknown variants                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE — record-level rules                              │
//! │  ├── ids present, items non-empty, amounts in range                     │
//! │  └── Runs on every ledger write (local put AND cloud upsert)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  └── NOT NULL / PRIMARY KEY constraints                                 │
//! │                                                                         │
//! │  A record that fails here is NEVER persisted.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{CartItem, HoldOrder, Order, OrderItem};

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a record id: must be non-empty after trimming.
pub fn validate_id(field: &'static str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a quantity: must be positive.
pub fn validate_qty(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }
    Ok(())
}

/// Validates a monetary amount in whole Rupiah: must not be negative.
/// Zero is allowed (free items, comped orders).
pub fn validate_amount(field: &'static str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

fn validate_order_item(index: usize, item: &OrderItem) -> ValidationResult<()> {
    if item.id.trim().is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: format!("item {} has no id", index),
        });
    }
    if item.name.trim().is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: format!("item {} has no name", index),
        });
    }
    validate_qty(item.qty)?;
    validate_amount("price", item.price)?;
    Ok(())
}

fn validate_cart_item(index: usize, item: &CartItem) -> ValidationResult<()> {
    if item.id.trim().is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: format!("item {} has no id", index),
        });
    }
    if item.name.trim().is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: format!("item {} has no name", index),
        });
    }
    validate_qty(item.qty)?;
    validate_amount("price", item.price)?;
    Ok(())
}

/// Validates a full [`Order`] record before any durable write.
///
/// ## Rules
/// - `id` non-empty
/// - `items` non-empty; every item has id, name, positive qty,
///   non-negative price
/// - `total` and `paid` non-negative
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    validate_id("id", &order.id)?;
    validate_amount("total", order.total)?;
    validate_amount("paid", order.paid)?;

    if order.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    for (i, item) in order.items.iter().enumerate() {
        validate_order_item(i, item)?;
    }

    Ok(())
}

/// Validates a full [`HoldOrder`] record before any durable write.
///
/// A hold's items may not be empty either: a cashier can only park a cart
/// that has something in it, and merge/split never produce empty holds.
pub fn validate_hold_order(hold: &HoldOrder) -> ValidationResult<()> {
    validate_id("id", &hold.id)?;

    if hold.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    for (i, item) in hold.items.iter().enumerate() {
        validate_cart_item(i, item)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryType, OrderStatus, OrderType, PaymentMethod};
    use chrono::Utc;

    fn sample_order() -> Order {
        Order {
            id: "order-1-abc".into(),
            created_at: Utc::now(),
            total: 25000,
            paid: 30000,
            payment_method: PaymentMethod::Cash,
            order_type: OrderType::DineIn,
            customer_name: Some("Budi".into()),
            items: vec![OrderItem {
                id: "prod-1".into(),
                name: "Kopi Tubruk".into(),
                qty: 1,
                price: 25000,
                category_type: CategoryType::Drink,
                notes: None,
                is_done: false,
            }],
            is_synced: false,
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(validate_order(&sample_order()).is_ok());
    }

    #[test]
    fn test_order_without_items_rejected() {
        let mut order = sample_order();
        order.items.clear();
        assert!(matches!(
            validate_order(&order),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_order_with_blank_id_rejected() {
        let mut order = sample_order();
        order.id = "  ".into();
        assert!(matches!(
            validate_order(&order),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_negative_total_rejected() {
        let mut order = sample_order();
        order.total = -1;
        assert!(validate_order(&order).is_err());
    }

    #[test]
    fn test_zero_qty_item_rejected() {
        let mut order = sample_order();
        order.items[0].qty = 0;
        assert!(matches!(
            validate_order(&order),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_hold_order_validation() {
        let hold = HoldOrder {
            id: "hold-1-abc".into(),
            items: vec![CartItem {
                id: "prod-2".into(),
                name: "Roti Bakar".into(),
                qty: 2,
                price: 15000,
                category_type: CategoryType::Food,
                notes: None,
            }],
            customer_name: None,
            order_type: OrderType::TakeAway,
            created_at: Utc::now(),
            merged_from: None,
            split_from: None,
        };
        assert!(validate_hold_order(&hold).is_ok());

        let empty = HoldOrder {
            items: vec![],
            ..hold
        };
        assert!(validate_hold_order(&empty).is_err());
    }
}
