//! Payment records
//!
//! One record per payment attempt. A payment is never deleted; after creation
//! only `status`, `approved_by` and `updated_at` change, and only through
//! [`Payment::approve`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::error::PaymentError;
use crate::impl_entity;

/// How a payment was tendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "mpesa", alias = "mobile_money", alias = "mobile-money")]
    MobileMoney,
    #[serde(rename = "bank_transfer", alias = "bank-transfer")]
    BankTransfer,
    #[serde(rename = "card")]
    Card,
}

impl PaymentMethod {
    /// Cash is collected in person and needs an admin to confirm it
    pub fn requires_approval(self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Status a new payment starts in
    pub fn initial_status(self) -> PaymentStatus {
        if self.requires_approval() {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Successful
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileMoney => "mpesa",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a payment
///
/// `Pending → Successful` is the only transition; `Successful` and `Failed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Successful => "successful",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub rental_id: Uuid,
    pub amount: f64,
    pub balance: f64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub month: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub approved_by: Option<Uuid>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Payment, "payment", "payments");

/// Inputs for a new payment attempt
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub tenant_id: Uuid,
    pub rental_id: Uuid,
    pub amount: f64,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub month: String,
    pub receipt_url: Option<String>,
}

impl Payment {
    /// Build a payment with a precomputed balance
    pub fn new(input: NewPayment, balance: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            rental_id: input.rental_id,
            amount: input.amount,
            balance,
            method: input.method,
            transaction_id: input.transaction_id,
            month: input.month,
            status: input.method.initial_status(),
            approved_by: None,
            receipt_url: input.receipt_url,
            payment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Successful
    }

    /// Confirm a pending cash payment on behalf of an admin
    ///
    /// Leaves the payment untouched on error.
    pub fn approve(&mut self, admin_id: Uuid) -> Result<(), PaymentError> {
        if !self.method.requires_approval() {
            return Err(PaymentError::NotCash {
                payment_id: self.id,
            });
        }
        if self.status != PaymentStatus::Pending {
            return Err(PaymentError::InvalidTransition {
                payment_id: self.id,
                from: self.status,
                to: PaymentStatus::Successful,
            });
        }

        self.status = PaymentStatus::Successful;
        self.approved_by = Some(admin_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}
