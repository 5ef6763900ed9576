use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ComplaintStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "resolved")]
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub rental_id: Option<Uuid>,
    #[serde(default)]
    pub house_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Complaint, "complaint", "complaints");

impl Complaint {
    pub fn new(
        tenant_id: Uuid,
        rental_id: Option<Uuid>,
        house_id: Option<Uuid>,
        subject: String,
        description: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            rental_id,
            house_id,
            subject,
            description,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
