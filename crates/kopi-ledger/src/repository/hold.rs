//! # Hold Order Repository
//!
//! Durable storage for parked carts.
//!
//! Holds are short-lived and always read whole, so their item list is
//! stored as a JSON payload column rather than relational rows. Merge and
//! split go through [`HoldRepository::replace`], which removes the source
//! holds and inserts the results in a single transaction: the store never
//! shows a state where the items exist twice or not at all.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use kopi_core::{validate_hold_order, CartItem, HoldOrder, OrderType};

use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct HoldRow {
    id: String,
    items: String,
    customer_name: Option<String>,
    order_type: OrderType,
    created_at: DateTime<Utc>,
    merged_from: Option<String>,
    split_from: Option<String>,
}

impl HoldRow {
    fn into_hold(self) -> LedgerResult<HoldOrder> {
        let items: Vec<CartItem> = serde_json::from_str(&self.items).map_err(|e| {
            LedgerError::CorruptRecord(format!("hold {} items: {}", self.id, e))
        })?;
        let merged_from: Option<Vec<String>> = match &self.merged_from {
            Some(raw) => Some(serde_json::from_str(raw).map_err(|e| {
                LedgerError::CorruptRecord(format!("hold {} merged_from: {}", self.id, e))
            })?),
            None => None,
        };

        Ok(HoldOrder {
            id: self.id,
            items,
            customer_name: self.customer_name,
            order_type: self.order_type,
            created_at: self.created_at,
            merged_from,
            split_from: self.split_from,
        })
    }
}

// =============================================================================
// Hold Repository
// =============================================================================

/// Repository for hold-order persistence.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    pool: SqlitePool,
}

impl HoldRepository {
    /// Creates a new repository with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        HoldRepository { pool }
    }

    /// Persists a hold, replacing any existing record with the same id.
    ///
    /// Validation runs first; a hold with no items is never persisted.
    pub async fn put(&self, hold: &HoldOrder) -> LedgerResult<()> {
        validate_hold_order(hold)?;

        let mut tx = self.pool.begin().await?;
        insert_hold(&mut tx, hold).await?;
        tx.commit().await?;

        debug!(hold_id = %hold.id, lines = hold.items.len(), "Hold persisted");
        Ok(())
    }

    /// Returns all holds, oldest first (queue order for the hold list).
    pub async fn get_all(&self) -> LedgerResult<Vec<HoldOrder>> {
        let rows: Vec<HoldRow> = sqlx::query_as(
            "SELECT id, items, customer_name, order_type, created_at,
                    merged_from, split_from
             FROM hold_orders
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HoldRow::into_hold).collect()
    }

    /// Returns a single hold, or `None` if absent.
    pub async fn get_by_id(&self, id: &str) -> LedgerResult<Option<HoldOrder>> {
        let row: Option<HoldRow> = sqlx::query_as(
            "SELECT id, items, customer_name, order_type, created_at,
                    merged_from, split_from
             FROM hold_orders
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(HoldRow::into_hold).transpose()
    }

    /// Deletes a hold. Returns whether a record existed.
    ///
    /// Deleting an absent id is a quiet no-op, not an error.
    pub async fn delete(&self, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM hold_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts stored holds.
    pub async fn count(&self) -> LedgerResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hold_orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Atomically removes `remove_ids` and inserts `holds`.
    ///
    /// This is the primitive under merge and split: sources disappear and
    /// results appear in one transaction, so a crash leaves either the old
    /// holds or the new ones, never both and never neither.
    pub async fn replace(&self, remove_ids: &[String], holds: &[HoldOrder]) -> LedgerResult<()> {
        for hold in holds {
            validate_hold_order(hold)?;
        }

        let mut tx = self.pool.begin().await?;
        for id in remove_ids {
            sqlx::query("DELETE FROM hold_orders WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        for hold in holds {
            insert_hold(&mut tx, hold).await?;
        }
        tx.commit().await?;

        debug!(
            removed = remove_ids.len(),
            inserted = holds.len(),
            "Hold set replaced"
        );
        Ok(())
    }
}

/// Writes a hold inside the caller's transaction.
async fn insert_hold(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    hold: &HoldOrder,
) -> LedgerResult<()> {
    let items = serde_json::to_string(&hold.items)
        .map_err(|e| LedgerError::Internal(format!("encode hold items: {}", e)))?;
    let merged_from = hold
        .merged_from
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| LedgerError::Internal(format!("encode merged_from: {}", e)))?;

    sqlx::query(
        "INSERT OR REPLACE INTO hold_orders
            (id, items, customer_name, order_type, created_at, merged_from, split_from)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&hold.id)
    .bind(items)
    .bind(&hold.customer_name)
    .bind(hold.order_type)
    .bind(hold.created_at.to_rfc3339())
    .bind(merged_from)
    .bind(&hold.split_from)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Ledger, LedgerConfig};
    use kopi_core::CategoryType;

    async fn test_ledger() -> Ledger {
        Ledger::new(LedgerConfig::in_memory()).await.unwrap()
    }

    fn sample_hold(id: &str) -> HoldOrder {
        HoldOrder {
            id: id.to_string(),
            items: vec![CartItem {
                id: "prod-1".into(),
                name: "Es Kopi Susu".into(),
                qty: 2,
                price: 18000,
                category_type: CategoryType::Drink,
                notes: None,
            }],
            customer_name: Some("Budi".into()),
            order_type: OrderType::DineIn,
            created_at: Utc::now(),
            merged_from: None,
            split_from: None,
        }
    }

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        let hold = sample_hold("hold-1");
        repo.put(&hold).await.unwrap();

        let loaded = repo.get_by_id("hold-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "hold-1");
        assert_eq!(loaded.items, hold.items);
        assert_eq!(loaded.customer_name.as_deref(), Some("Budi"));
        assert!(loaded.merged_from.is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_empty_hold() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        let mut hold = sample_hold("hold-empty");
        hold.items.clear();
        assert!(repo.put(&hold).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lineage_fields_round_trip() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        let mut hold = sample_hold("hold-merged");
        hold.merged_from = Some(vec!["hold-a".into(), "hold-b".into()]);
        repo.put(&hold).await.unwrap();

        let mut child = sample_hold("hold-split");
        child.split_from = Some("hold-merged".into());
        repo.put(&child).await.unwrap();

        let merged = repo.get_by_id("hold-merged").await.unwrap().unwrap();
        assert_eq!(
            merged.merged_from,
            Some(vec!["hold-a".to_string(), "hold-b".to_string()])
        );

        let split = repo.get_by_id("hold-split").await.unwrap().unwrap();
        assert_eq!(split.split_from.as_deref(), Some("hold-merged"));
    }

    #[tokio::test]
    async fn test_delete_absent_is_quiet() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        assert!(!repo.delete("hold-gone").await.unwrap());
        repo.put(&sample_hold("hold-1")).await.unwrap();
        assert!(repo.delete("hold-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_is_atomic_on_validation_failure() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        repo.put(&sample_hold("hold-1")).await.unwrap();

        let mut bad = sample_hold("hold-new");
        bad.items.clear();
        let result = repo
            .replace(&["hold-1".to_string()], std::slice::from_ref(&bad))
            .await;
        assert!(result.is_err());

        // The source hold must survive a failed replace
        assert!(repo.get_by_id("hold-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_all_is_oldest_first() {
        let ledger = test_ledger().await;
        let repo = ledger.holds();

        let mut older = sample_hold("hold-old");
        older.created_at = Utc::now() - chrono::Duration::minutes(30);
        repo.put(&sample_hold("hold-new")).await.unwrap();
        repo.put(&older).await.unwrap();

        let holds = repo.get_all().await.unwrap();
        assert_eq!(holds[0].id, "hold-old");
        assert_eq!(holds[1].id, "hold-new");
    }
}
