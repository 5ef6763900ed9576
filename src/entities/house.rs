use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Occupied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: Uuid,
    pub house_no: String,
    pub price: f64,
    #[serde(default)]
    pub availability: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(House, "house", "houses");

impl House {
    pub fn new(house_no: String, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            house_no,
            price,
            availability: Availability::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}
