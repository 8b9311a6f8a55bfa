//! # Order Repository
//!
//! Durable storage for finalized orders.
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Write Paths                                  │
//! │                                                                         │
//! │  Checkout ────────► put()               is_synced = false               │
//! │  Sync ack ────────► mark_synced()       is_synced = true (one-way)      │
//! │  Kitchen ─────────► set_status()        PENDING → ... → COMPLETED       │
//! │  Kitchen ─────────► set_item_done()     per-line completion             │
//! │  Cloud pull ──────► upsert_from_cloud() normalized, is_synced = true    │
//! │                                                                         │
//! │  Items are replaced wholesale with their parent: an order's line        │
//! │  list never changes after checkout, only per-line is_done does.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use kopi_core::{
    validate_order, CategoryType, Order, OrderItem, OrderStatus, OrderType, PaymentMethod,
};

use crate::error::LedgerResult;
use crate::normalize;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    created_at: DateTime<Utc>,
    total: i64,
    paid: i64,
    payment_method: PaymentMethod,
    order_type: OrderType,
    customer_name: Option<String>,
    is_synced: bool,
    status: OrderStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    name: String,
    qty: i64,
    price: i64,
    category_type: CategoryType,
    notes: Option<String>,
    is_done: bool,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        OrderItem {
            id: row.id,
            name: row.name,
            qty: row.qty,
            price: row.price,
            category_type: row.category_type,
            notes: row.notes,
            is_done: row.is_done,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            created_at: self.created_at,
            total: self.total,
            paid: self.paid,
            payment_method: self.payment_method,
            order_type: self.order_type,
            customer_name: self.customer_name,
            items,
            is_synced: self.is_synced,
            status: self.status,
        }
    }
}

// =============================================================================
// Upsert Report
// =============================================================================

/// Outcome summary of a cloud reconciliation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// Records normalized and written.
    pub applied: usize,
    /// Records skipped as malformed (logged, never persisted).
    pub skipped: usize,
}

// =============================================================================
// Order Repository
// =============================================================================

/// Repository for order persistence.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new repository with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists an order, replacing any existing record with the same id.
    ///
    /// The order and its items are written in one transaction; a crash
    /// mid-write leaves either the old record or the new one, never a
    /// half-written order.
    ///
    /// Validation runs first; an invalid order is never persisted.
    pub async fn put(&self, order: &Order) -> LedgerResult<()> {
        validate_order(order)?;

        let mut tx = self.pool.begin().await?;
        write_order(&mut tx, order).await?;
        tx.commit().await?;

        debug!(order_id = %order.id, total = order.total, "Order persisted");
        Ok(())
    }

    /// Returns all orders, newest first.
    pub async fn get_all(&self) -> LedgerResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, created_at, total, paid, payment_method, order_type,
                    customer_name, is_synced, status
             FROM orders
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }

    /// Returns a single order, or `None` if absent.
    pub async fn get_by_id(&self, id: &str) -> LedgerResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, created_at, total, paid, payment_method, order_type,
                    customer_name, is_synced, status
             FROM orders
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.load_items(&row.id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Deletes an order (items cascade). Returns whether a record existed.
    ///
    /// Deleting an absent id is a quiet no-op, not an error.
    pub async fn delete(&self, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks an order as acknowledged by the remote store.
    ///
    /// One-way by construction: there is no API to clear the flag, keeping
    /// `is_synced` monotonic on this device. Returns whether the order
    /// still existed (a vanished order makes this a quiet no-op).
    pub async fn mark_synced(&self, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("UPDATE orders SET is_synced = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let existed = result.rows_affected() > 0;
        if !existed {
            debug!(order_id = %id, "mark_synced on vanished order, ignoring");
        }
        Ok(existed)
    }

    /// Updates an order's kitchen status. No-op if the order is absent.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> LedgerResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flags a single line item, addressed by its position in the order,
    /// as done (or not) on the kitchen display. Positions rather than item
    /// ids because remote records may repeat an id across lines, and the
    /// kitchen ticks off exactly one line.
    /// No-op if the order or position is absent.
    pub async fn set_item_done(
        &self,
        order_id: &str,
        position: usize,
        done: bool,
    ) -> LedgerResult<bool> {
        let result = sqlx::query(
            "UPDATE order_items SET is_done = ?1 WHERE order_id = ?2 AND position = ?3",
        )
        .bind(done)
        .bind(order_id)
        .bind(position as i64)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns all orders still awaiting cloud acknowledgement, oldest
    /// first (push order preserves checkout order).
    pub async fn get_unsynced(&self) -> LedgerResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, created_at, total, paid, payment_method, order_type,
                    customer_name, is_synced, status
             FROM orders
             WHERE is_synced = 0
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }

    /// Counts orders still awaiting cloud acknowledgement.
    pub async fn count_unsynced(&self) -> LedgerResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE is_synced = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Reconciles a batch of remote order records into the ledger.
    ///
    /// Each record is normalized (casing-tolerant fields, legacy item ids,
    /// coerced timestamps) and written with `is_synced` forced true: a
    /// record coming FROM the cloud is by definition already there.
    ///
    /// Malformed records are skipped and logged; one bad record never
    /// aborts the batch. Re-applying the same batch is idempotent.
    pub async fn upsert_from_cloud(
        &self,
        records: &[serde_json::Value],
    ) -> LedgerResult<UpsertReport> {
        let mut report = UpsertReport::default();

        for (index, record) in records.iter().enumerate() {
            let order = match normalize::order_from_remote(record) {
                Ok(order) => order,
                Err(err) => {
                    warn!(index, %err, "Skipping malformed remote order record");
                    report.skipped += 1;
                    continue;
                }
            };

            let mut tx = self.pool.begin().await?;
            write_order(&mut tx, &order).await?;
            tx.commit().await?;
            report.applied += 1;
        }

        debug!(
            applied = report.applied,
            skipped = report.skipped,
            "Cloud reconciliation batch done"
        );
        Ok(report)
    }

    async fn load_items(&self, order_id: &str) -> LedgerResult<Vec<OrderItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, name, qty, price, category_type, notes, is_done
             FROM order_items
             WHERE order_id = ?1
             ORDER BY position ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

/// Writes an order and its items inside the caller's transaction.
async fn write_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order: &Order,
) -> LedgerResult<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO orders
            (id, created_at, total, paid, payment_method, order_type,
             customer_name, is_synced, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&order.id)
    .bind(order.created_at.to_rfc3339())
    .bind(order.total)
    .bind(order.paid)
    .bind(order.payment_method)
    .bind(order.order_type)
    .bind(&order.customer_name)
    .bind(order.is_synced)
    .bind(order.status)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(&order.id)
        .execute(&mut **tx)
        .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items
                (order_id, position, id, name, qty, price, category_type, notes, is_done)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&order.id)
        .bind(position as i64)
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.qty)
        .bind(item.price)
        .bind(item.category_type)
        .bind(&item.notes)
        .bind(item.is_done)
        .execute(&mut **tx)
        .await?;
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
    use chrono::Utc;
    use serde_json::json;

    async fn test_ledger() -> Ledger {
        Ledger::new(LedgerConfig::in_memory()).await.unwrap()
    }

    fn sample_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            created_at: Utc::now(),
            total: 43000,
            paid: 50000,
            payment_method: PaymentMethod::Cash,
            order_type: OrderType::DineIn,
            customer_name: Some("Budi".into()),
            items: vec![
                OrderItem {
                    id: "prod-1".into(),
                    name: "Es Kopi Susu".into(),
                    qty: 2,
                    price: 18000,
                    category_type: CategoryType::Drink,
                    notes: Some("less sugar".into()),
                    is_done: false,
                },
                OrderItem {
                    id: "prod-2".into(),
                    name: "Pisang Goreng".into(),
                    qty: 1,
                    price: 7000,
                    category_type: CategoryType::Food,
                    notes: None,
                    is_done: false,
                },
            ],
            is_synced: false,
            status: OrderStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let order = sample_order("order-1");
        repo.put(&order).await.unwrap();

        let loaded = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, order.id);
        assert_eq!(loaded.total, 43000);
        assert_eq!(loaded.items.len(), 2);
        // Entry order preserved
        assert_eq!(loaded.items[0].id, "prod-1");
        assert_eq!(loaded.items[1].id, "prod-2");
        assert!(!loaded.is_synced);
    }

    #[tokio::test]
    async fn test_get_absent_order_is_none() {
        let ledger = test_ledger().await;
        assert!(ledger.orders().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_invalid_order() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let mut order = sample_order("order-bad");
        order.items.clear();
        assert!(repo.put(&order).await.is_err());

        // Nothing persisted
        assert!(repo.get_by_id("order-bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_synced_is_one_way() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        repo.put(&sample_order("order-1")).await.unwrap();
        assert_eq!(repo.count_unsynced().await.unwrap(), 1);

        assert!(repo.mark_synced("order-1").await.unwrap());
        assert_eq!(repo.count_unsynced().await.unwrap(), 0);

        let loaded = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert!(loaded.is_synced);

        // Flipping a vanished order is a quiet no-op
        assert!(!repo.mark_synced("order-gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_unsynced_scan_is_oldest_first() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let mut older = sample_order("order-old");
        older.created_at = Utc::now() - chrono::Duration::minutes(10);
        let newer = sample_order("order-new");

        repo.put(&newer).await.unwrap();
        repo.put(&older).await.unwrap();

        let pending = repo.get_unsynced().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, "order-old");
        assert_eq!(pending[1].id, "order-new");
    }

    #[tokio::test]
    async fn test_status_and_item_done_updates() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();
        repo.put(&sample_order("order-1")).await.unwrap();

        assert!(repo
            .set_status("order-1", OrderStatus::Preparing)
            .await
            .unwrap());
        assert!(repo.set_item_done("order-1", 0, true).await.unwrap());

        let loaded = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Preparing);
        assert!(loaded.items[0].is_done);
        assert!(!loaded.items[1].is_done);

        // Absent rows are quiet no-ops
        assert!(!repo
            .set_status("order-gone", OrderStatus::Ready)
            .await
            .unwrap());
        assert!(!repo.set_item_done("order-1", 99, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_item_done_touches_one_line_despite_duplicate_ids() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        // Same product on two lines (regular + promo reorder)
        let mut order = sample_order("order-1");
        order.items[1].id = order.items[0].id.clone();
        repo.put(&order).await.unwrap();

        assert!(repo.set_item_done("order-1", 1, true).await.unwrap());

        let loaded = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert!(!loaded.items[0].is_done);
        assert!(loaded.items[1].is_done);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();
        repo.put(&sample_order("order-1")).await.unwrap();

        assert!(repo.delete("order-1").await.unwrap());
        assert!(!repo.delete("order-1").await.unwrap());

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items")
            .fetch_one(ledger.pool())
            .await
            .unwrap();
        assert_eq!(row.0, 0);
    }

    fn remote_record(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "createdAt": "2026-08-20T09:30:00Z",
            "total": 25000,
            "paid": 25000,
            "paymentMethod": "qris",
            "orderType": "Take Away",
            "customerName": "Sari",
            "items": [
                { "name": "Kopi Tubruk", "qty": 1, "price": 25000 }
            ],
            "status": "COMPLETED"
        })
    }

    #[tokio::test]
    async fn test_upsert_from_cloud_normalizes_and_forces_synced() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let report = repo
            .upsert_from_cloud(&[remote_record("order-cloud-1")])
            .await
            .unwrap();
        assert_eq!(report, UpsertReport { applied: 1, skipped: 0 });

        let loaded = repo.get_by_id("order-cloud-1").await.unwrap().unwrap();
        assert!(loaded.is_synced);
        assert_eq!(loaded.payment_method, PaymentMethod::Qris);
        // Legacy item without id gets a synthesized one
        assert_eq!(loaded.items[0].id, "item-legacy-0");
        assert_eq!(loaded.items[0].category_type, CategoryType::Food);
    }

    #[tokio::test]
    async fn test_upsert_from_cloud_is_idempotent() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let batch = vec![remote_record("order-cloud-1")];
        repo.upsert_from_cloud(&batch).await.unwrap();
        repo.upsert_from_cloud(&batch).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_from_cloud_skips_malformed() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        let batch = vec![
            remote_record("order-cloud-1"),
            json!({ "id": "order-bad", "paymentMethod": "VISA" }),
            remote_record("order-cloud-2"),
        ];
        let report = repo.upsert_from_cloud(&batch).await.unwrap();
        assert_eq!(report, UpsertReport { applied: 2, skipped: 1 });
        assert!(repo.get_by_id("order-bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_never_unsyncs_local_order() {
        let ledger = test_ledger().await;
        let repo = ledger.orders();

        repo.put(&sample_order("order-1")).await.unwrap();
        repo.mark_synced("order-1").await.unwrap();

        // Remote copy of the same order comes back in a pull
        let mut record = remote_record("order-1");
        record["isSynced"] = json!(false); // hostile input, must be ignored
        repo.upsert_from_cloud(&[record]).await.unwrap();

        let loaded = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert!(loaded.is_synced);
    }
}
