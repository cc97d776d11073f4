use chrono::Utc;

use crate::db::queries;
use crate::models::{Booking, BookingEvent};
use crate::state::AppState;

/// Appends a row to the durable event feed and publishes it to live SSE
/// subscribers. Feed failures are logged and never fail the mutation that
/// produced the event. Must not be called while holding the db lock.
pub fn record_booking_event(state: &AppState, booking: &Booking, kind: &str) {
    let inserted = {
        let db = state.db.lock().unwrap();
        queries::insert_booking_event(&db, &booking.id, &booking.venue_id, kind)
    };

    match inserted {
        Ok(id) => {
            let event = BookingEvent {
                id,
                booking_id: booking.id.clone(),
                venue_id: booking.venue_id.clone(),
                kind: kind.to_string(),
                created_at: Utc::now()
                    .naive_utc()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            };
            // send only fails when nobody is subscribed
            let _ = state.events_tx.send(event);
        }
        Err(e) => {
            tracing::error!(error = %e, booking_id = %booking.id, "failed to record booking event");
        }
    }
}
