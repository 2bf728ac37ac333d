//! Reservation hold model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldStatus {
    /// Waiting in the title's FIFO queue
    Active,
    /// Lapsed without being fulfilled or cancelled
    Expired,
    /// Converted into a loan
    Fulfilled,
    /// Withdrawn by the holder
    Cancelled,
}

impl HoldStatus {
    pub fn is_active(self) -> bool {
        self == HoldStatus::Active
    }
}

/// A claim on priority for the next freed copy of a title.
///
/// Holds are state-transitioned, never deleted; the full history stays in the
/// queue store as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationHold {
    pub id: Uuid,
    pub holder_id: i64,
    pub title_key: String,
    pub placed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Monotonic insertion counter; breaks FIFO ties when two holds share a
    /// coarse `placed_at` timestamp
    pub sequence: u64,
    pub status: HoldStatus,
}
