//! # Identifier Generation
//!
//! Time-prefixed, collision-resistant ids for orders and hold orders.
//!
//! ## Format
//! `{prefix}-{millis}-{suffix}` where `millis` is the Unix timestamp in
//! milliseconds and `suffix` is 8 hex chars of UUID v4 entropy.
//!
//! The millisecond prefix makes ids roughly sortable by creation time on a
//! single device; the random suffix keeps concurrent calls within the same
//! millisecond collision-resistant. No coordination is required, which is
//! the point: ids must be mintable while fully offline.
//!
//! ## Example
//! `order-1767168000123-9f86d081`

use uuid::Uuid;

/// Generates a new id with the given prefix.
///
/// ## Example
/// ```rust
/// use kopi_core::new_id;
///
/// let id = new_id("order");
/// assert!(id.starts_with("order-"));
/// ```
pub fn new_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    format!("{}-{}-{}", prefix, millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_shape() {
        let id = new_id("hold");
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "hold");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_new_id_unique_within_same_millisecond() {
        // A burst of ids minted back to back must never collide.
        let ids: HashSet<String> = (0..1000).map(|_| new_id("order")).collect();
        assert_eq!(ids.len(), 1000);
    }
}
