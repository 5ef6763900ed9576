//! Denormalized payment shape returned by the API and pushed to tenants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{House, Payment, PaymentMethod, PaymentStatus, User};

/// Shown when the paying user no longer exists
pub const UNKNOWN_TENANT: &str = "Unknown";
/// Shown when the rental or its house no longer exists
pub const UNKNOWN_HOUSE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub tenant_email: Option<String>,
    pub rental_id: Uuid,
    pub house_no: String,
    pub method: PaymentMethod,
    pub amount: f64,
    pub balance: f64,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub month: String,
    pub approved_by: Option<Uuid>,
    pub receipt_url: Option<String>,
    pub payment_date: DateTime<Utc>,
}

impl PaymentView {
    /// Join a payment with whatever is left of its tenant and house
    pub fn assemble(payment: &Payment, tenant: Option<&User>, house: Option<&House>) -> Self {
        Self {
            id: payment.id,
            tenant_id: payment.tenant_id,
            tenant_name: tenant
                .map(|u| u.name.clone())
                .unwrap_or_else(|| UNKNOWN_TENANT.to_string()),
            tenant_email: tenant.map(|u| u.email.clone()),
            rental_id: payment.rental_id,
            house_no: house
                .map(|h| h.house_no.clone())
                .unwrap_or_else(|| UNKNOWN_HOUSE.to_string()),
            method: payment.method,
            amount: payment.amount,
            balance: payment.balance,
            transaction_id: payment.transaction_id.clone(),
            status: payment.status,
            month: payment.month.clone(),
            approved_by: payment.approved_by,
            receipt_url: payment.receipt_url.clone(),
            payment_date: payment.payment_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NewPayment, Role};

    #[test]
    fn test_missing_relations_use_placeholders() {
        let payment = Payment::new(
            NewPayment {
                tenant_id: Uuid::new_v4(),
                rental_id: Uuid::new_v4(),
                amount: 500.0,
                method: PaymentMethod::Card,
                transaction_id: Some("TX1".to_string()),
                month: "Nov".to_string(),
                receipt_url: None,
            },
            0.0,
        );

        let view = PaymentView::assemble(&payment, None, None);
        assert_eq!(view.tenant_name, "Unknown");
        assert_eq!(view.house_no, "N/A");
        assert!(view.tenant_email.is_none());

        let tenant = User::new(
            "Jane".to_string(),
            "jane@example.com".to_string(),
            None,
            String::new(),
            Role::Tenant,
        );
        let house = House::new("B7".to_string(), 500.0);
        let view = PaymentView::assemble(&payment, Some(&tenant), Some(&house));
        assert_eq!(view.tenant_name, "Jane");
        assert_eq!(view.house_no, "B7");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["houseNo"], "B7");
        assert_eq!(json["transactionId"], "TX1");
        assert_eq!(json["method"], "card");
    }
}
