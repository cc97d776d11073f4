use serde::{Deserialize, Serialize};

/// One row of the durable booking event feed. `kind` is one of
/// `created`, `confirmed`, `cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub id: i64,
    pub booking_id: String,
    pub venue_id: String,
    pub kind: String,
    pub created_at: String,
}
