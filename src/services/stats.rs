use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Booking, BookingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsScope {
    Admin,
    Manager,
}

#[derive(Debug, Serialize)]
pub struct BookingStats {
    pub total_bookings: usize,
    pub active_bookings: usize,
    pub pending_bookings: usize,
    pub total_revenue: f64,
    /// Venue id → booking count; manager scope only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings_per_venue: Option<HashMap<String, usize>>,
}

/// Summary counters over a snapshot of the booking set. Only confirmed
/// bookings count as active or contribute revenue.
pub fn compute_stats(bookings: &[Booking], scope: StatsScope) -> BookingStats {
    let active_bookings = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();
    let pending_bookings = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Pending)
        .count();
    let total_revenue = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.total_amount)
        .sum();

    let bookings_per_venue = match scope {
        StatsScope::Admin => None,
        StatsScope::Manager => {
            let mut per_venue: HashMap<String, usize> = HashMap::new();
            for booking in bookings {
                *per_venue.entry(booking.venue_id.clone()).or_default() += 1;
            }
            Some(per_venue)
        }
    };

    BookingStats {
        total_bookings: bookings.len(),
        active_bookings,
        pending_bookings,
        total_revenue,
        bookings_per_venue,
    }
}
