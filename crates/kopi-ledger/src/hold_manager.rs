//! # Hold Order Manager
//!
//! Lifecycle operations for parked carts: park, resume, merge, split.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Hold Order Lifecycle                                │
//! │                                                                         │
//! │   Cart ── park ──► Hold ── resume ──► Cart ── checkout ──► Order        │
//! │                     │ ▲                                                 │
//! │          merge      │ │      split                                      │
//! │   Hold ──┐          │ │          ┌──► Hold (split_from = h)             │
//! │   Hold ──┼──► Hold ─┘ └── Hold ──┼──► Hold (split_from = h)             │
//! │   Hold ──┘   (merged_from=[...]) └──► ...                               │
//! │                                                                         │
//! │   Merge and split are atomic: sources are removed and results           │
//! │   inserted in one transaction. Originals never survive alongside        │
//! │   their results.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resume Durability Gap
//! `resume_hold` deletes the stored hold and returns the record; until the
//! cashier finalizes (or re-parks), those items exist only in the live
//! cart. A crash in that window loses them. This mirrors how cashiers
//! actually work a resumed ticket and is accepted; callers that cannot
//! accept it can re-park immediately.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use kopi_core::{new_id, CartItem, HoldOrder, HOLD_ID_PREFIX};

use crate::error::{LedgerError, LedgerResult};
use crate::pool::Ledger;
use crate::repository::HoldRepository;

/// Separator used when merging customer names ("Budi / Sari").
const MERGED_NAME_SEPARATOR: &str = " / ";

// =============================================================================
// Hold Order Manager
// =============================================================================

/// Manager for the hold-order collection.
///
/// Stateless over the ledger: the database IS the hold list, so every
/// terminal restart starts from exactly what was durably parked.
#[derive(Debug, Clone)]
pub struct HoldOrderManager {
    repo: HoldRepository,
}

impl HoldOrderManager {
    /// Creates a manager over the given ledger.
    pub fn new(ledger: &Ledger) -> Self {
        HoldOrderManager {
            repo: ledger.holds(),
        }
    }

    /// Verifies the hold collection is readable and reports its size.
    ///
    /// Idempotent; call at startup. Errors here mean the local store is
    /// unusable and must be surfaced loudly, not swallowed.
    pub async fn initialize(&self) -> LedgerResult<usize> {
        let count = self.repo.count().await?;
        info!(holds = count, "Hold order manager ready");
        Ok(count as usize)
    }

    /// Returns all holds, oldest first.
    pub async fn holds(&self) -> LedgerResult<Vec<HoldOrder>> {
        self.repo.get_all().await
    }

    /// Returns a single hold, or `None` if absent.
    pub async fn get(&self, id: &str) -> LedgerResult<Option<HoldOrder>> {
        self.repo.get_by_id(id).await
    }

    /// Parks a hold (typically built by `Cart::park`). Re-parking under
    /// the same id overwrites the previous snapshot.
    pub async fn add_hold(&self, hold: &HoldOrder) -> LedgerResult<()> {
        self.repo.put(hold).await
    }

    /// Discards a hold. Removing an absent id is a quiet no-op.
    pub async fn remove_hold(&self, id: &str) -> LedgerResult<bool> {
        self.repo.delete(id).await
    }

    /// Resumes a hold: removes it from the store and hands the record to
    /// the caller for loading into the cart.
    ///
    /// Returns `None` when the hold no longer exists (another action beat
    /// this one to it).
    pub async fn resume_hold(&self, id: &str) -> LedgerResult<Option<HoldOrder>> {
        let hold = match self.repo.get_by_id(id).await? {
            Some(hold) => hold,
            None => return Ok(None),
        };
        self.repo.delete(id).await?;
        info!(hold_id = %id, lines = hold.items.len(), "Hold resumed");
        Ok(Some(hold))
    }

    /// Merges several holds into one (tables joining up).
    ///
    /// Item lists are concatenated in the order the ids were given; lines
    /// are never combined, so two holds carrying the same product at
    /// different prices (a promo, a manual discount) both keep their price
    /// and notes, and the merged subtotal equals the sum of the sources'.
    /// Customer names are joined with " / "; the order type comes from the
    /// first surviving source. The result records its lineage in
    /// `merged_from`.
    ///
    /// Ids that no longer exist are skipped with a warning; the merge
    /// proceeds with the survivors. All sources gone is an error and
    /// nothing is written.
    pub async fn merge_holds(&self, ids: &[String]) -> LedgerResult<HoldOrder> {
        let mut sources = Vec::new();
        for id in ids {
            match self.repo.get_by_id(id).await? {
                Some(hold) => sources.push(hold),
                None => warn!(hold_id = %id, "Merge source vanished, skipping"),
            }
        }

        if sources.is_empty() {
            return Err(LedgerError::EmptyMerge);
        }
        if sources.len() == 1 {
            warn!(
                hold_id = %sources[0].id,
                "Merge with a single surviving source, result is a re-park"
            );
        }

        let mut items: Vec<CartItem> = Vec::new();
        for source in &sources {
            items.extend(source.items.iter().cloned());
        }

        let names: Vec<&str> = sources
            .iter()
            .filter_map(|s| s.customer_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .collect();
        let customer_name = if names.is_empty() {
            None
        } else {
            Some(names.join(MERGED_NAME_SEPARATOR))
        };

        let source_ids: Vec<String> = sources.iter().map(|s| s.id.clone()).collect();
        let merged = HoldOrder {
            id: new_id(HOLD_ID_PREFIX),
            items,
            customer_name,
            order_type: sources[0].order_type,
            created_at: Utc::now(),
            merged_from: Some(source_ids.clone()),
            split_from: None,
        };

        self.repo.replace(&source_ids, std::slice::from_ref(&merged)).await?;
        info!(
            merged_id = %merged.id,
            sources = source_ids.len(),
            "Holds merged"
        );
        Ok(merged)
    }

    /// Splits one hold into several (a table splitting the bill).
    ///
    /// `groups` assigns every unit of every line to exactly one result.
    /// The groups must partition the original's items exactly, by item id
    /// and summed quantity; any surplus, shortfall, or unknown item fails
    /// the whole operation before anything is written. Each result keeps
    /// the original's customer name and order type and records its lineage
    /// in `split_from`. A single group is allowed: a degenerate split that
    /// re-parks the whole hold under a new id, mirroring the degenerate
    /// one-source merge.
    pub async fn split_hold(
        &self,
        id: &str,
        groups: &[Vec<CartItem>],
    ) -> LedgerResult<Vec<HoldOrder>> {
        let original = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Hold order", id))?;

        if groups.iter().any(|group| group.is_empty()) {
            return Err(LedgerError::SplitMismatch(
                "every split group needs at least one item".to_string(),
            ));
        }
        verify_partition(&original.items, groups)?;

        let holds: Vec<HoldOrder> = groups
            .iter()
            .map(|group| HoldOrder {
                id: new_id(HOLD_ID_PREFIX),
                items: group.clone(),
                customer_name: original.customer_name.clone(),
                order_type: original.order_type,
                created_at: Utc::now(),
                merged_from: None,
                split_from: Some(original.id.clone()),
            })
            .collect();

        self.repo.replace(std::slice::from_ref(&original.id), &holds).await?;
        info!(
            hold_id = %original.id,
            parts = holds.len(),
            "Hold split"
        );
        Ok(holds)
    }
}

/// Checks that `groups` partition `original` exactly: same item ids, same
/// summed quantity per id, nothing extra.
fn verify_partition(original: &[CartItem], groups: &[Vec<CartItem>]) -> LedgerResult<()> {
    let mut expected: HashMap<&str, i64> = HashMap::new();
    for item in original {
        *expected.entry(item.id.as_str()).or_insert(0) += item.qty;
    }

    let mut actual: HashMap<&str, i64> = HashMap::new();
    for item in groups.iter().flatten() {
        *actual.entry(item.id.as_str()).or_insert(0) += item.qty;
    }

    for (item_id, qty) in &actual {
        match expected.get(item_id) {
            None => {
                return Err(LedgerError::SplitMismatch(format!(
                    "item {} is not in the original hold",
                    item_id
                )))
            }
            Some(expected_qty) if expected_qty != qty => {
                return Err(LedgerError::SplitMismatch(format!(
                    "item {} quantity {} does not match original {}",
                    item_id, qty, expected_qty
                )))
            }
            Some(_) => {}
        }
    }
    for (item_id, expected_qty) in &expected {
        if !actual.contains_key(item_id) {
            return Err(LedgerError::SplitMismatch(format!(
                "item {} ({} units) is missing from the groups",
                item_id, expected_qty
            )));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Ledger, LedgerConfig};
    use kopi_core::{CategoryType, OrderType};

    async fn setup() -> (Ledger, HoldOrderManager) {
        let ledger = Ledger::new(LedgerConfig::in_memory()).await.unwrap();
        let manager = HoldOrderManager::new(&ledger);
        (ledger, manager)
    }

    fn item(id: &str, qty: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            qty,
            price: 10000,
            category_type: CategoryType::Drink,
            notes: None,
        }
    }

    fn hold(id: &str, customer: Option<&str>, items: Vec<CartItem>) -> HoldOrder {
        HoldOrder {
            id: id.to_string(),
            items,
            customer_name: customer.map(String::from),
            order_type: OrderType::DineIn,
            created_at: Utc::now(),
            merged_from: None,
            split_from: None,
        }
    }

    #[tokio::test]
    async fn test_initialize_reports_count() {
        let (_ledger, manager) = setup().await;
        assert_eq!(manager.initialize().await.unwrap(), 0);

        manager
            .add_hold(&hold("hold-1", Some("Budi"), vec![item("p1", 1)]))
            .await
            .unwrap();
        assert_eq!(manager.initialize().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resume_removes_and_returns() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold("hold-1", Some("Budi"), vec![item("p1", 2)]))
            .await
            .unwrap();

        let resumed = manager.resume_hold("hold-1").await.unwrap().unwrap();
        assert_eq!(resumed.id, "hold-1");
        assert_eq!(resumed.items[0].qty, 2);

        // Gone after resume; second resume is None, not an error
        assert!(manager.get("hold-1").await.unwrap().is_none());
        assert!(manager.resume_hold("hold-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_concatenates_lines_and_joins_names() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold(
                "hold-a",
                Some("Budi"),
                vec![item("p1", 1), item("p2", 1)],
            ))
            .await
            .unwrap();
        manager
            .add_hold(&hold("hold-b", Some("Sari"), vec![item("p1", 2)]))
            .await
            .unwrap();

        let merged = manager
            .merge_holds(&["hold-a".to_string(), "hold-b".to_string()])
            .await
            .unwrap();

        assert!(merged.id.starts_with("hold-"));
        assert_eq!(merged.customer_name.as_deref(), Some("Budi / Sari"));
        assert_eq!(
            merged.merged_from,
            Some(vec!["hold-a".to_string(), "hold-b".to_string()])
        );

        // Plain concatenation in id order: p1 appears twice, never summed
        assert_eq!(merged.items.len(), 3);
        assert_eq!(merged.items[0].id, "p1");
        assert_eq!(merged.items[0].qty, 1);
        assert_eq!(merged.items[1].id, "p2");
        assert_eq!(merged.items[2].id, "p1");
        assert_eq!(merged.items[2].qty, 2);

        // Sources are gone, only the merged hold remains
        let remaining = manager.holds().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, merged.id);
    }

    #[tokio::test]
    async fn test_merge_keeps_same_product_lines_with_their_prices() {
        let (_ledger, manager) = setup().await;

        let regular = CartItem {
            id: "p1".to_string(),
            name: "Es Kopi Susu".to_string(),
            qty: 1,
            price: 18000,
            category_type: CategoryType::Drink,
            notes: Some("hot".to_string()),
        };
        let promo = CartItem {
            id: "p1".to_string(),
            name: "Es Kopi Susu".to_string(),
            qty: 2,
            price: 15000,
            category_type: CategoryType::Drink,
            notes: Some("iced, promo price".to_string()),
        };
        manager
            .add_hold(&hold("hold-a", None, vec![regular.clone()]))
            .await
            .unwrap();
        manager
            .add_hold(&hold("hold-b", None, vec![promo.clone()]))
            .await
            .unwrap();

        let merged = manager
            .merge_holds(&["hold-a".to_string(), "hold-b".to_string()])
            .await
            .unwrap();

        // Both lines survive with their own price and notes, so the merged
        // subtotal equals the sum of the sources' subtotals
        assert_eq!(merged.items.len(), 2);
        assert_eq!(merged.items[0].price, 18000);
        assert_eq!(merged.items[0].notes.as_deref(), Some("hot"));
        assert_eq!(merged.items[1].price, 15000);
        assert_eq!(merged.items[1].notes.as_deref(), Some("iced, promo price"));
        assert_eq!(merged.subtotal(), 18000 + 2 * 15000);
    }

    #[tokio::test]
    async fn test_merge_skips_vanished_sources() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold("hold-a", None, vec![item("p1", 1)]))
            .await
            .unwrap();

        let merged = manager
            .merge_holds(&["hold-a".to_string(), "hold-gone".to_string()])
            .await
            .unwrap();
        assert_eq!(merged.merged_from, Some(vec!["hold-a".to_string()]));
        assert!(merged.customer_name.is_none());
    }

    #[tokio::test]
    async fn test_merge_with_no_survivors_fails() {
        let (_ledger, manager) = setup().await;
        let result = manager.merge_holds(&["hold-x".to_string()]).await;
        assert!(matches!(result, Err(LedgerError::EmptyMerge)));
    }

    #[tokio::test]
    async fn test_split_partitions_items() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold(
                "hold-1",
                Some("Meja 4"),
                vec![item("p1", 3), item("p2", 1)],
            ))
            .await
            .unwrap();

        let parts = manager
            .split_hold(
                "hold-1",
                &[vec![item("p1", 1), item("p2", 1)], vec![item("p1", 2)]],
            )
            .await
            .unwrap();

        assert_eq!(parts.len(), 2);
        for part in &parts {
            assert_eq!(part.split_from.as_deref(), Some("hold-1"));
            assert_eq!(part.customer_name.as_deref(), Some("Meja 4"));
        }

        // Original gone, both parts stored
        assert!(manager.get("hold-1").await.unwrap().is_none());
        assert_eq!(manager.holds().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_split_rejects_bad_partition() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold("hold-1", None, vec![item("p1", 3)]))
            .await
            .unwrap();

        // Quantity mismatch: 1 + 1 != 3
        let result = manager
            .split_hold("hold-1", &[vec![item("p1", 1)], vec![item("p1", 1)]])
            .await;
        assert!(matches!(result, Err(LedgerError::SplitMismatch(_))));

        // Unknown item
        let result = manager
            .split_hold("hold-1", &[vec![item("p1", 3)], vec![item("p9", 1)]])
            .await;
        assert!(matches!(result, Err(LedgerError::SplitMismatch(_))));

        // Original untouched by the failed attempts
        let original = manager.get("hold-1").await.unwrap().unwrap();
        assert_eq!(original.items[0].qty, 3);
    }

    #[tokio::test]
    async fn test_split_single_group_reparks_under_new_id() {
        let (_ledger, manager) = setup().await;
        manager
            .add_hold(&hold("hold-1", Some("Meja 4"), vec![item("p1", 3)]))
            .await
            .unwrap();

        let parts = manager
            .split_hold("hold-1", &[vec![item("p1", 3)]])
            .await
            .unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].split_from.as_deref(), Some("hold-1"));
        assert_eq!(parts[0].items[0].qty, 3);

        assert!(manager.get("hold-1").await.unwrap().is_none());
        assert_eq!(manager.holds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_split_absent_hold_is_not_found() {
        let (_ledger, manager) = setup().await;
        let result = manager
            .split_hold("hold-x", &[vec![item("p1", 1)], vec![item("p2", 1)]])
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }
}
