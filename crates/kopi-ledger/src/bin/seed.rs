//! Seed binary: fills a ledger with demo orders and holds.
//!
//! ## Usage
//! ```bash
//! cargo run -p kopi-ledger --bin seed                 # ./kopi.db
//! cargo run -p kopi-ledger --bin seed -- ./demo.db    # custom path
//! ```
//!
//! Refuses to touch a ledger that already has orders, so it is safe to run
//! against a real terminal database by accident.

use chrono::{Duration, Utc};

use kopi_core::{
    CartItem, CategoryType, HoldOrder, Order, OrderItem, OrderStatus, OrderType, PaymentMethod,
};
use kopi_ledger::{Ledger, LedgerConfig, LedgerResult};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./kopi.db".to_string());

    if let Err(err) = seed(&path).await {
        eprintln!("Seed failed: {}", err);
        std::process::exit(1);
    }
}

async fn seed(path: &str) -> LedgerResult<()> {
    println!("Opening ledger at {}", path);
    let ledger = Ledger::new(LedgerConfig::new(path)).await?;

    let orders = ledger.orders();
    let existing = orders.get_all().await?;
    if !existing.is_empty() {
        println!(
            "Ledger already has {} orders, refusing to seed",
            existing.len()
        );
        return Ok(());
    }

    let now = Utc::now();

    for (i, order) in demo_orders(now).iter().enumerate() {
        orders.put(order).await?;
        println!("  [{}] order {} ({})", i + 1, order.id, order.total);
    }

    let holds = ledger.holds();
    for hold in demo_holds(now) {
        holds.put(&hold).await?;
        println!("  hold {} ({} lines)", hold.id, hold.items.len());
    }

    println!(
        "Done: {} orders ({} unsynced), {} holds",
        orders.get_all().await?.len(),
        orders.count_unsynced().await?,
        holds.count().await?,
    );
    Ok(())
}

fn demo_orders(now: chrono::DateTime<Utc>) -> Vec<Order> {
    vec![
        Order {
            id: "order-demo-1".into(),
            created_at: now - Duration::hours(2),
            total: 43000,
            paid: 50000,
            payment_method: PaymentMethod::Cash,
            order_type: OrderType::DineIn,
            customer_name: Some("Budi".into()),
            items: vec![
                item("prod-eks", "Es Kopi Susu", 2, 18000, CategoryType::Drink),
                item("prod-pis", "Pisang Goreng", 1, 7000, CategoryType::Food),
            ],
            is_synced: true,
            status: OrderStatus::Completed,
        },
        Order {
            id: "order-demo-2".into(),
            created_at: now - Duration::minutes(20),
            total: 25000,
            paid: 25000,
            payment_method: PaymentMethod::Qris,
            order_type: OrderType::TakeAway,
            customer_name: Some("Sari".into()),
            items: vec![item(
                "prod-tub",
                "Kopi Tubruk",
                1,
                25000,
                CategoryType::Drink,
            )],
            is_synced: false,
            status: OrderStatus::Ready,
        },
        Order {
            id: "order-demo-3".into(),
            created_at: now - Duration::minutes(5),
            total: 30000,
            paid: 30000,
            payment_method: PaymentMethod::Dana,
            order_type: OrderType::DineIn,
            customer_name: None,
            items: vec![
                item("prod-teh", "Teh Manis", 2, 5000, CategoryType::Drink),
                item("prod-rot", "Roti Bakar", 1, 20000, CategoryType::Food),
            ],
            is_synced: false,
            status: OrderStatus::Preparing,
        },
    ]
}

fn demo_holds(now: chrono::DateTime<Utc>) -> Vec<HoldOrder> {
    vec![HoldOrder {
        id: "hold-demo-1".into(),
        items: vec![CartItem {
            id: "prod-eks".into(),
            name: "Es Kopi Susu".into(),
            qty: 1,
            price: 18000,
            category_type: CategoryType::Drink,
            notes: Some("less sugar".into()),
        }],
        customer_name: Some("Meja 4".into()),
        order_type: OrderType::DineIn,
        created_at: now - Duration::minutes(10),
        merged_from: None,
        split_from: None,
    }]
}

fn item(id: &str, name: &str, qty: i64, price: i64, category: CategoryType) -> OrderItem {
    OrderItem {
        id: id.into(),
        name: name.into(),
        qty,
        price,
        category_type: category,
        notes: None,
        is_done: false,
    }
}
