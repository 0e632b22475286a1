use std::fmt;

use chrono::prelude::*;
use uuid::Uuid;

use models::{CartLine, Coordinate, CustomerId};

/// Client-side id of one submission attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        SubmissionId(Uuid::new_v4())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Built at submit time only, never stored locally.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderDraft {
    pub submission_id: SubmissionId,
    pub customer_id: CustomerId,
    pub lines: Vec<CartLine>,
    pub delivery_address: String,
    pub delivery_coordinate: Coordinate,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for OrderDraft {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OrderDraft - submission_id: {}, customer_id: {}, lines: {}, delivery_address: {}, delivery_coordinate: {}",
            self.submission_id,
            self.customer_id,
            self.lines.len(),
            self.delivery_address,
            self.delivery_coordinate
        )
    }
}

/// Order API acknowledgment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlaced {
    pub order_number: String,
    pub total_amount: f64,
}
