//! Integration tests for the MongoDB storage backend
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a MongoDB container)
//! - Feature flag `mongodb_backend` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features mongodb_backend --test mongodb_tests
//! ```
//!
//! All tests share a single MongoDB container (via `OnceLock`). Each test
//! gets its own database.

#![cfg(feature = "mongodb_backend")]

use mongodb::Client;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tenant_portal::payments::NoopNotifier;
use tenant_portal::prelude::*;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh database per test)
// ---------------------------------------------------------------------------

struct MongoTestEnv {
    /// Dropping this stops the container
    _container: testcontainers::ContainerAsync<Mongo>,
    connection_url: String,
}

static TEST_ENV: OnceLock<MongoTestEnv> = OnceLock::new();

async fn init_mongo_env() -> &'static MongoTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container (is Docker running?)");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();
    let url = format!("mongodb://{}:{}", host, port);

    let _ = TEST_ENV.set(MongoTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn mongo_database() -> mongodb::Database {
    let env = init_mongo_env().await;
    let client = Client::with_uri_str(&env.connection_url)
        .await
        .expect("Failed to connect to MongoDB");
    let db_num = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    client.database(&format!("tenant_portal_test_{}", db_num))
}

fn cash(tenant_id: Uuid, rental_id: Uuid, amount: f64) -> NewPayment {
    NewPayment {
        tenant_id,
        rental_id,
        amount,
        method: PaymentMethod::Cash,
        transaction_id: None,
        month: "October".to_string(),
        receipt_url: None,
    }
}

// ---------------------------------------------------------------------------
// MongoDataService contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_get_update_delete() {
    let houses = MongoDataService::<House>::new(mongo_database().await);

    let house = houses.create(House::new("A1".to_string(), 12_000.0)).await.unwrap();
    let fetched = houses.get(&house.id).await.unwrap().unwrap();
    assert_eq!(fetched, house);

    let mut changed = fetched.clone();
    changed.availability = Availability::Occupied;
    houses.update(&house.id, changed).await.unwrap();
    let fetched = houses.get(&house.id).await.unwrap().unwrap();
    assert_eq!(fetched.availability, Availability::Occupied);

    houses.delete(&house.id).await.unwrap();
    assert!(houses.get(&house.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_missing_record_fails() {
    let houses = MongoDataService::<House>::new(mongo_database().await);
    let ghost = House::new("Z9".to_string(), 1.0);

    assert!(houses.update(&ghost.id, ghost.clone()).await.is_err());
}

#[tokio::test]
async fn test_search_matches_string_and_uuid_fields() {
    let users = MongoDataService::<User>::new(mongo_database().await);
    let jane = User::new(
        "Jane".to_string(),
        "jane@example.com".to_string(),
        None,
        "hash".to_string(),
        Role::Tenant,
    );
    users.create(jane.clone()).await.unwrap();
    users
        .create(User::new(
            "Admin".to_string(),
            "admin@example.com".to_string(),
            None,
            "hash".to_string(),
            Role::Admin,
        ))
        .await
        .unwrap();

    let found = users.search("email", "jane@example.com").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, jane.id);

    let admins = users.search("role", "admin").await.unwrap();
    assert_eq!(admins.len(), 1);
    assert!(users.search("email", "nobody@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let payments = MongoDataService::<Payment>::new(mongo_database().await);
    let tenant = Uuid::new_v4();
    let rental = Uuid::new_v4();

    let first = payments
        .create(Payment::new(cash(tenant, rental, 100.0), 900.0))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = payments
        .create(Payment::new(cash(tenant, rental, 200.0), 700.0))
        .await
        .unwrap();

    let listed = payments.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    let by_rental = payments.search("rentalId", &rental.to_string()).await.unwrap();
    assert_eq!(by_rental.len(), 2);
}

// ---------------------------------------------------------------------------
// Ledger over MongoDB
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ledger_flow_over_mongodb() {
    let stores = Stores::mongodb(mongo_database().await);
    let tenant = stores
        .users
        .create(User::new(
            "Jane".to_string(),
            "jane@example.com".to_string(),
            None,
            "hash".to_string(),
            Role::Tenant,
        ))
        .await
        .unwrap();
    let house = stores
        .houses
        .create(House::new("A1".to_string(), 10_000.0))
        .await
        .unwrap();
    let rental = stores
        .rentals
        .create(Rental::new(house.id, tenant.id, 10_000.0, Utc::now(), None))
        .await
        .unwrap();

    let ledger = PaymentLedger::new(stores.clone(), Arc::new(NoopNotifier));

    let first = ledger.create_payment(cash(tenant.id, rental.id, 4_000.0)).await.unwrap();
    assert_eq!(first.balance, 6_000.0);
    assert_eq!(first.status, PaymentStatus::Pending);
    assert_eq!(first.house_no, "A1");

    let second = ledger.create_payment(cash(tenant.id, rental.id, 6_000.0)).await.unwrap();
    assert_eq!(second.balance, 0.0);

    let approved = ledger.approve_cash_payment(first.id, Uuid::new_v4()).await.unwrap();
    assert_eq!(approved.status, PaymentStatus::Successful);

    let rental = stores.rentals.get(&rental.id).await.unwrap().unwrap();
    assert_eq!(rental.payment_status, RentalPaymentStatus::Paid);

    let mine = ledger.list_for_tenant(tenant.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, second.id);
}
