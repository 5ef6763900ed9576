//! Integration tests for the tenant notification channel
//!
//! These tests spin up a real HTTP+WebSocket server and verify the full
//! flow: connect → registerTenant → ledger mutation → paymentApproved via WS.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tenant_portal::prelude::{
    AppConfig, DataService, House, NewPayment, PaymentMethod, Rental, Role, ServerBuilder,
    ServerHost, User, Utc, Uuid,
};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsWrite = futures_util::stream::SplitSink<WsStream, Message>;
type WsRead = futures_util::stream::SplitStream<WsStream>;

/// Helper: start a test server and return (address, host)
async fn start_test_server() -> (SocketAddr, Arc<ServerHost>) {
    let (host, app) = ServerBuilder::new()
        .with_config(AppConfig::default_config())
        .build_with_host()
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, host)
}

/// Helper: a tenant with an active rental, written straight to the stores
async fn seed_rental(host: &ServerHost, name: &str, rent: f64) -> (Uuid, Uuid) {
    let tenant = host
        .stores
        .users
        .create(User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            None,
            "unused".to_string(),
            Role::Tenant,
        ))
        .await
        .unwrap();
    let house = host
        .stores
        .houses
        .create(House::new(format!("H-{}", name), rent))
        .await
        .unwrap();
    let rental = host
        .stores
        .rentals
        .create(Rental::new(house.id, tenant.id, rent, Utc::now(), None))
        .await
        .unwrap();
    (tenant.id, rental.id)
}

fn payment(tenant_id: Uuid, rental_id: Uuid, amount: f64, method: PaymentMethod) -> NewPayment {
    NewPayment {
        tenant_id,
        rental_id,
        amount,
        method,
        transaction_id: None,
        month: "October".to_string(),
        receipt_url: None,
    }
}

/// Helper: connect to WS and return the welcome message + stream
async fn ws_connect(addr: SocketAddr) -> (Value, WsWrite, WsRead) {
    let url = format!("ws://{}/ws", addr);
    let (ws_stream, _) = connect_async(&url).await.expect("Failed to connect");
    let (write, mut read) = ws_stream.split();

    let welcome = ws_recv(&mut read).await;
    assert_eq!(welcome["event"], "welcome");

    (welcome, write, read)
}

async fn ws_send(write: &mut WsWrite, msg: &Value) {
    let text = serde_json::to_string(msg).unwrap();
    write.send(Message::Text(text.into())).await.unwrap();
}

async fn ws_recv(read: &mut WsRead) -> Value {
    let msg = timeout(Duration::from_secs(2), read.next())
        .await
        .expect("Timeout waiting for WS message")
        .expect("Stream ended")
        .expect("WS error");

    match msg {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("Expected text message, got {:?}", other),
    }
}

/// Assert that nothing arrives within a short window
async fn ws_assert_silent(read: &mut WsRead) {
    let next = timeout(Duration::from_millis(300), read.next()).await;
    assert!(next.is_err(), "unexpected message: {:?}", next);
}

async fn register(write: &mut WsWrite, read: &mut WsRead, tenant_id: Uuid) {
    ws_send(write, &json!({"event": "registerTenant", "data": tenant_id})).await;
    let reply = ws_recv(read).await;
    assert_eq!(reply["event"], "registered");
    assert_eq!(reply["data"]["tenantId"], tenant_id.to_string());
}

// === Tests ===

#[tokio::test]
async fn test_ws_connect_and_welcome() {
    let (addr, _host) = start_test_server().await;
    let (welcome, _write, _read) = ws_connect(addr).await;

    let conn_id = welcome["data"]["connectionId"].as_str().unwrap();
    assert!(conn_id.starts_with("conn_"));
}

#[tokio::test]
async fn test_ws_ping_pong() {
    let (addr, _host) = start_test_server().await;
    let (_welcome, mut write, mut read) = ws_connect(addr).await;

    ws_send(&mut write, &json!({"event": "ping"})).await;

    let pong = ws_recv(&mut read).await;
    assert_eq!(pong["event"], "pong");
}

#[tokio::test]
async fn test_ws_invalid_message_returns_error() {
    let (addr, _host) = start_test_server().await;
    let (_welcome, mut write, mut read) = ws_connect(addr).await;

    write
        .send(Message::Text("not json".into()))
        .await
        .unwrap();
    let reply = ws_recv(&mut read).await;
    assert_eq!(reply["event"], "error");
    assert!(
        reply["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid message")
    );

    ws_send(&mut write, &json!({"event": "registerTenant", "data": "nope"})).await;
    let reply = ws_recv(&mut read).await;
    assert_eq!(reply["event"], "error");
}

#[tokio::test]
async fn test_successful_payment_reaches_registered_tenant() {
    let (addr, host) = start_test_server().await;
    let (tenant_id, rental_id) = seed_rental(&host, "Jane", 10_000.0).await;

    let (_welcome, mut write, mut read) = ws_connect(addr).await;
    register(&mut write, &mut read, tenant_id).await;

    let created = host
        .ledger()
        .create_payment(payment(tenant_id, rental_id, 10_000.0, PaymentMethod::MobileMoney))
        .await
        .unwrap();

    let event = ws_recv(&mut read).await;
    assert_eq!(event["event"], "paymentApproved");
    assert_eq!(event["data"]["id"], created.id.to_string());
    assert_eq!(event["data"]["status"], "successful");
    assert_eq!(event["data"]["tenantName"], "Jane");
    assert_eq!(event["data"]["houseNo"], "H-Jane");
}

#[tokio::test]
async fn test_other_tenants_are_not_notified() {
    let (addr, host) = start_test_server().await;
    let (jane, jane_rental) = seed_rental(&host, "Jane", 10_000.0).await;
    let (bob, _) = seed_rental(&host, "Bob", 10_000.0).await;

    let (_w, mut bob_write, mut bob_read) = ws_connect(addr).await;
    register(&mut bob_write, &mut bob_read, bob).await;

    host.ledger()
        .create_payment(payment(jane, jane_rental, 10_000.0, PaymentMethod::Card))
        .await
        .unwrap();

    ws_assert_silent(&mut bob_read).await;
}

#[tokio::test]
async fn test_cash_is_pushed_only_after_approval() {
    let (addr, host) = start_test_server().await;
    let (tenant_id, rental_id) = seed_rental(&host, "Jane", 10_000.0).await;

    let (_welcome, mut write, mut read) = ws_connect(addr).await;
    register(&mut write, &mut read, tenant_id).await;

    let ledger = host.ledger();
    let pending = ledger
        .create_payment(payment(tenant_id, rental_id, 4_000.0, PaymentMethod::Cash))
        .await
        .unwrap();
    ws_assert_silent(&mut read).await;

    let admin = Uuid::new_v4();
    ledger.approve_cash_payment(pending.id, admin).await.unwrap();

    let event = ws_recv(&mut read).await;
    assert_eq!(event["event"], "paymentApproved");
    assert_eq!(event["data"]["id"], pending.id.to_string());
    assert_eq!(event["data"]["method"], "cash");
    assert_eq!(event["data"]["approvedBy"], admin.to_string());
}

#[tokio::test]
async fn test_every_connection_in_the_room_is_notified() {
    let (addr, host) = start_test_server().await;
    let (tenant_id, rental_id) = seed_rental(&host, "Jane", 10_000.0).await;

    let (_w1, mut write1, mut read1) = ws_connect(addr).await;
    let (_w2, mut write2, mut read2) = ws_connect(addr).await;
    register(&mut write1, &mut read1, tenant_id).await;
    register(&mut write2, &mut read2, tenant_id).await;

    host.ledger()
        .create_payment(payment(tenant_id, rental_id, 10_000.0, PaymentMethod::BankTransfer))
        .await
        .unwrap();

    assert_eq!(ws_recv(&mut read1).await["event"], "paymentApproved");
    assert_eq!(ws_recv(&mut read2).await["event"], "paymentApproved");
}

#[tokio::test]
async fn test_unregister_stops_delivery() {
    let (addr, host) = start_test_server().await;
    let (tenant_id, rental_id) = seed_rental(&host, "Jane", 10_000.0).await;

    let (_welcome, mut write, mut read) = ws_connect(addr).await;
    register(&mut write, &mut read, tenant_id).await;

    ws_send(&mut write, &json!({"event": "unregisterTenant", "data": tenant_id})).await;
    let reply = ws_recv(&mut read).await;
    assert_eq!(reply["event"], "unregistered");

    host.ledger()
        .create_payment(payment(tenant_id, rental_id, 10_000.0, PaymentMethod::MobileMoney))
        .await
        .unwrap();

    ws_assert_silent(&mut read).await;
}

#[tokio::test]
async fn test_disconnect_does_not_break_the_room() {
    let (addr, host) = start_test_server().await;
    let (tenant_id, rental_id) = seed_rental(&host, "Jane", 10_000.0).await;

    {
        let (_w, mut write, mut read) = ws_connect(addr).await;
        register(&mut write, &mut read, tenant_id).await;
        write.close().await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (_w, mut write, mut read) = ws_connect(addr).await;
    register(&mut write, &mut read, tenant_id).await;

    host.ledger()
        .create_payment(payment(tenant_id, rental_id, 10_000.0, PaymentMethod::MobileMoney))
        .await
        .unwrap();

    assert_eq!(ws_recv(&mut read).await["event"], "paymentApproved");
}
