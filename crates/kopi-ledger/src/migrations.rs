//! # Schema Migrations
//!
//! Embedded, additive-only migrations for the local ledger.
//!
//! ## Why Embedded
//! The POS terminal has no deploy step: the binary IS the deploy. Baking
//! migration SQL into the binary with `sqlx::migrate!` means every upgrade
//! carries its own schema and an older ledger file is upgraded in place on
//! first open.
//!
//! ## Rules
//! - Additive only: new tables, new nullable columns, new indexes
//! - Never rewrite or drop a shipped table
//! - Applied migrations are tracked in `_sqlx_migrations`

use sqlx::SqlitePool;

use crate::error::LedgerResult;

/// Runs all pending migrations against the given pool.
///
/// Idempotent: already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> LedgerResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Ledger, LedgerConfig};

    #[tokio::test]
    async fn test_migrations_create_expected_tables() {
        let ledger = Ledger::new(LedgerConfig::in_memory()).await.unwrap();

        for table in ["orders", "order_items", "hold_orders"] {
            let row: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(ledger.pool())
            .await
            .unwrap();
            assert_eq!(row.0, 1, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let ledger = Ledger::new(LedgerConfig::in_memory()).await.unwrap();
        // Second run must be a no-op, not an error.
        ledger.run_migrations().await.unwrap();
    }
}
