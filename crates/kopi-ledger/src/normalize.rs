//! # Remote Record Normalization
//!
//! Converts loosely-shaped remote order records into strict [`Order`]
//! values before they may touch the ledger.
//!
//! ## Why This Exists
//! The cloud store has accumulated records from several client generations.
//! Field casing drifts (`createdAt` vs `created_at`), payment labels arrive
//! lowercase, legacy items carry no ids, and timestamps appear as ISO
//! strings or epoch numbers. This module is the single tolerance point:
//! everything downstream of it sees only canonical, validated records.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Normalization Rules                                  │
//! │                                                                         │
//! │  Field lookup      exact name, then case-insensitive, then snake_case   │
//! │  paymentMethod     uppercased; unknown labels REJECT the record         │
//! │  orderType         tolerant parse; missing → "Dine In"                  │
//! │  status            tolerant parse; missing → PENDING                    │
//! │  item id           missing → "item-legacy-{index}"                      │
//! │  categoryType      missing → FOOD                                       │
//! │  createdAt         ISO string or epoch secs/millis; bad value REJECTS   │
//! │  isSynced          ALWAYS true, whatever the record says                │
//! │                                                                         │
//! │  A record failing any REJECT rule is skipped and logged by the          │
//! │  caller; it is never persisted.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use kopi_core::{
    validate_order, CategoryType, Order, OrderItem, OrderStatus, OrderType, PaymentMethod,
    ValidationError, ValidationResult, LEGACY_ITEM_ID_PREFIX,
};

// =============================================================================
// Entry Point
// =============================================================================

/// Normalizes one remote order record into a strict [`Order`].
///
/// `is_synced` is forced true: a record coming from the cloud is by
/// definition already there, whatever the payload claims.
pub fn order_from_remote(record: &Value) -> ValidationResult<Order> {
    if !record.is_object() {
        return Err(invalid("record", "not a JSON object"));
    }

    let id = lookup(record, "id")
        .and_then(as_string)
        .ok_or_else(|| required("id"))?;

    let created_at = lookup(record, "createdAt")
        .ok_or_else(|| required("createdAt"))
        .and_then(parse_timestamp)?;

    let total = lookup(record, "total")
        .and_then(as_amount)
        .ok_or_else(|| required("total"))?;

    let paid = lookup(record, "paid")
        .and_then(as_amount)
        .ok_or_else(|| required("paid"))?;

    let payment_label = lookup(record, "paymentMethod")
        .and_then(as_string)
        .ok_or_else(|| required("paymentMethod"))?;
    let payment_method = PaymentMethod::parse(&payment_label).ok_or(ValidationError::NotAllowed {
        field: "paymentMethod".to_string(),
        value: payment_label,
        allowed: &["CASH", "DANA", "BCA", "QRIS"],
    })?;

    let order_type = match lookup(record, "orderType").and_then(as_string) {
        Some(label) => OrderType::parse(&label).ok_or(ValidationError::NotAllowed {
            field: "orderType".to_string(),
            value: label,
            allowed: &["Dine In", "Take Away"],
        })?,
        None => OrderType::default(),
    };

    let status = match lookup(record, "status").and_then(as_string) {
        Some(label) => OrderStatus::parse(&label).ok_or(ValidationError::NotAllowed {
            field: "status".to_string(),
            value: label,
            allowed: &["PENDING", "PREPARING", "READY", "COMPLETED", "CANCELLED"],
        })?,
        None => OrderStatus::default(),
    };

    let customer_name = lookup(record, "customerName").and_then(as_string);

    let raw_items = lookup(record, "items")
        .and_then(Value::as_array)
        .ok_or_else(|| required("items"))?;
    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        items.push(item_from_remote(index, raw)?);
    }

    let order = Order {
        id,
        created_at,
        total,
        paid,
        payment_method,
        order_type,
        customer_name,
        items,
        is_synced: true,
        status,
    };
    validate_order(&order)?;

    Ok(order)
}

fn item_from_remote(index: usize, raw: &Value) -> ValidationResult<OrderItem> {
    if !raw.is_object() {
        return Err(invalid("items", &format!("item {} is not an object", index)));
    }

    let id = lookup(raw, "id")
        .and_then(as_string)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("{}-{}", LEGACY_ITEM_ID_PREFIX, index));

    let name = lookup(raw, "name")
        .and_then(as_string)
        .ok_or_else(|| invalid("items", &format!("item {} has no name", index)))?;

    let qty = lookup(raw, "qty")
        .and_then(as_amount)
        .ok_or_else(|| invalid("items", &format!("item {} has no qty", index)))?;

    let price = lookup(raw, "price")
        .and_then(as_amount)
        .ok_or_else(|| invalid("items", &format!("item {} has no price", index)))?;

    let category_type = match lookup(raw, "categoryType").and_then(as_string) {
        Some(label) => CategoryType::parse(&label).ok_or(ValidationError::NotAllowed {
            field: "categoryType".to_string(),
            value: label,
            allowed: &["FOOD", "DRINK"],
        })?,
        None => CategoryType::default(),
    };

    let notes = lookup(raw, "notes").and_then(as_string).filter(|s| !s.is_empty());

    let is_done = lookup(raw, "isDone").and_then(as_bool).unwrap_or(false);

    Ok(OrderItem {
        id,
        name,
        qty,
        price,
        category_type,
        notes,
        is_done,
    })
}

// =============================================================================
// Field Coercion Helpers
// =============================================================================

/// Looks up a field by canonical camelCase name, tolerating the casing
/// drift seen in old records: exact match first, then case-insensitive,
/// then the snake_case spelling.
fn lookup<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    let obj = record.as_object()?;

    if let Some(v) = obj.get(name) {
        return Some(v);
    }

    let snake = to_snake_case(name);
    obj.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name) || key.eq_ignore_ascii_case(&snake))
        .map(|(_, v)| v)
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strings pass through; numbers become their decimal spelling (legacy
/// records stored some ids numerically).
fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whole-Rupiah amount: integer, float (rounded), or numeric string.
fn as_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Timestamps arrive as ISO-8601 strings or epoch numbers; epoch values
/// above 10^12 are taken as milliseconds, otherwise seconds.
fn parse_timestamp(value: &Value) -> ValidationResult<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            // Space-separated variant without zone, seen in exports
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Ok(Utc.from_utc_datetime(&naive));
            }
            Err(invalid("createdAt", &format!("unparseable timestamp '{}'", s)))
        }
        Value::Number(n) => {
            let raw = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .ok_or_else(|| invalid("createdAt", "non-integer epoch"))?;
            let millis = if raw.abs() >= 1_000_000_000_000 {
                raw
            } else {
                raw * 1000
            };
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| invalid("createdAt", &format!("epoch {} out of range", raw)))
        }
        _ => Err(invalid("createdAt", "expected string or number")),
    }
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
