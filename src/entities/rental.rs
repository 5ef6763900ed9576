//! Rental records: a lease of one house by one tenant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_entity;

/// Whether the current period has been settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RentalPaymentStatus {
    #[default]
    Pending,
    Paid,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    #[default]
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: Uuid,
    pub house_id: Uuid,
    pub tenant_id: Uuid,
    /// Rent due per period
    pub amount: f64,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub next_payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_status: RentalPaymentStatus,
    #[serde(default)]
    pub rental_status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Rental, "rental", "rentals");

impl Rental {
    pub fn new(
        house_id: Uuid,
        tenant_id: Uuid,
        amount: f64,
        start_date: DateTime<Utc>,
        next_payment_date: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            house_id,
            tenant_id,
            amount,
            start_date,
            next_payment_date,
            payment_status: RentalPaymentStatus::Pending,
            rental_status: RentalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.rental_status == RentalStatus::Active
    }
}
