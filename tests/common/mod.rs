//! Shared helpers for the HTTP integration tests
//!
//! `spawn_app()` builds the full router over in-memory stores with a
//! bootstrap admin already logged in.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use tenant_portal::prelude::*;

pub const ADMIN_EMAIL: &str = "admin@portal.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub server: TestServer,
    pub host: Arc<ServerHost>,
    pub mailer: Arc<MemoryMailer>,
    pub admin_id: Uuid,
    pub admin_token: String,
}

pub struct Tenant {
    pub id: Uuid,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    let mailer = Arc::new(MemoryMailer::new());
    let (host, app) = ServerBuilder::new()
        .with_config(AppConfig::default_config())
        .with_mailer(mailer.clone())
        .build_with_host()
        .expect("Failed to build app");

    let accounts = host.accounts();
    accounts
        .ensure_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to create admin");
    let session = accounts
        .authenticate(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to log admin in");

    let server = TestServer::new(app);

    TestApp {
        server,
        host,
        mailer,
        admin_id: session.user.id,
        admin_token: session.token,
    }
}

impl TestApp {
    /// Register a tenant over HTTP and log them in
    pub async fn tenant(&self, name: &str, email: &str) -> Tenant {
        self.server
            .post("/api/auth/register")
            .json(&json!({ "name": name, "email": email, "password": "tenant-pass" }))
            .await
            .assert_status(StatusCode::CREATED);

        let login: Value = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": "tenant-pass" }))
            .await
            .json();

        Tenant {
            id: login["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: login["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a house and lease it to `tenant_id` for `rent` per period
    pub async fn rental(&self, tenant_id: Uuid, house_no: &str, rent: f64) -> Uuid {
        let house: Value = self
            .server
            .post("/api/house/add")
            .authorization_bearer(&self.admin_token)
            .json(&json!({ "houseNo": house_no, "price": rent }))
            .await
            .json();
        let house_id = house["house"]["id"].as_str().unwrap();

        let rental: Value = self
            .server
            .post("/api/rental/add")
            .authorization_bearer(&self.admin_token)
            .json(&json!({ "houseId": house_id, "tenantId": tenant_id, "amount": rent }))
            .await
            .json();
        rental["rental"]["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn rental_record(&self, rental_id: Uuid) -> Rental {
        self.host
            .stores
            .rentals
            .get(&rental_id)
            .await
            .unwrap()
            .expect("rental should exist")
    }

    /// Submit a payment as `tenant`, returning the raw response
    pub async fn pay(
        &self,
        tenant: &Tenant,
        rental_id: Uuid,
        amount: f64,
        method: &str,
        month: &str,
    ) -> axum_test::TestResponse {
        self.server
            .post("/api/payment/add")
            .authorization_bearer(&tenant.token)
            .json(&json!({
                "rentalId": rental_id,
                "amount": amount,
                "method": method,
                "month": month,
            }))
            .await
    }
}
