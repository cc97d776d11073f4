use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub location: String,
    pub sport_type: Option<String>,
    pub total_courts: i32,
    pub price_per_hour: f64,
    pub manager_id: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}
