use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_entity;

/// Admin-to-tenant message; a broadcast has no recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    #[serde(default)]
    pub recipient_id: Option<Uuid>,
    #[serde(default)]
    pub is_broadcast: bool,
    pub subject: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Message, "message", "messages");

impl Message {
    pub fn new(
        sender_id: Uuid,
        recipient_id: Option<Uuid>,
        subject: String,
        content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender_id,
            is_broadcast: recipient_id.is_none(),
            recipient_id,
            subject,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` should see this message in their inbox
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.is_broadcast || self.recipient_id == Some(user_id)
    }
}
