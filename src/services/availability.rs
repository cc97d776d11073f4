use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

/// Reports whether a court is free for the candidate window. Cancelled
/// bookings do not occupy their slot.
///
/// This is a pure read. Callers that go on to insert must hold the
/// connection lock across both the check and the insert so racing
/// requests for the same slot serialize.
pub fn is_court_available(
    conn: &Connection,
    venue_id: &str,
    booking_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    court_number: i32,
) -> Result<bool, AppError> {
    if start_time >= end_time {
        return Err(AppError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    if court_number < 1 {
        return Err(AppError::Validation(
            "court_number must be at least 1".to_string(),
        ));
    }

    let existing = queries::find_overlap_candidates(conn, venue_id, court_number, booking_date)?;

    // Half-open windows: [s, e) overlaps the candidate iff start < e AND end > s,
    // so a booking ending exactly when another starts does not conflict.
    let occupied = existing
        .iter()
        .any(|b| start_time < b.end_time && end_time > b.start_time);

    Ok(!occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::BookingStatus;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn seed_venue_and_user(conn: &Connection) -> (String, String) {
        let venue = queries::insert_venue(conn, "Riverside", "12 River Rd", Some("tennis"), 4, 25.0, None).unwrap();
        let user = queries::insert_user(conn, "alice").unwrap();
        (venue.id, user.id)
    }

    fn book(conn: &Connection, venue_id: &str, user_id: &str, day: &str, start: &str, end: &str, court: i32) -> String {
        let booking = queries::insert_booking(
            conn, venue_id, user_id, date(day), time(start), time(end), court, 40.0,
        )
        .unwrap();
        booking.id
    }

    #[test]
    fn test_empty_schedule_is_available() {
        let conn = setup_db();
        let (venue_id, _) = seed_venue_and_user(&conn);

        let free = is_court_available(&conn, &venue_id, date("2025-07-01"), time("09:00"), time("10:00"), 1).unwrap();
        assert!(free);
    }

    #[test]
    fn test_overlapping_window_is_unavailable() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);

        let free = is_court_available(&conn, &venue_id, date("2025-07-01"), time("09:30"), time("10:30"), 1).unwrap();
        assert!(!free);
    }

    #[test]
    fn test_containing_window_is_unavailable() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);

        let free = is_court_available(&conn, &venue_id, date("2025-07-01"), time("08:00"), time("11:00"), 1).unwrap();
        assert!(!free);
    }

    #[test]
    fn test_touching_windows_do_not_conflict() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);

        // 10:00-11:00 starts exactly when the existing booking ends
        let after = is_court_available(&conn, &venue_id, date("2025-07-01"), time("10:00"), time("11:00"), 1).unwrap();
        assert!(after);

        // 08:00-09:00 ends exactly when the existing booking starts
        let before = is_court_available(&conn, &venue_id, date("2025-07-01"), time("08:00"), time("09:00"), 1).unwrap();
        assert!(before);
    }

    #[test]
    fn test_other_court_is_independent() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);

        let free = is_court_available(&conn, &venue_id, date("2025-07-01"), time("09:00"), time("10:00"), 2).unwrap();
        assert!(free);
    }

    #[test]
    fn test_other_date_is_independent() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);

        let free = is_court_available(&conn, &venue_id, date("2025-07-02"), time("09:00"), time("10:00"), 1).unwrap();
        assert!(free);
    }

    #[test]
    fn test_cancelled_booking_frees_the_slot() {
        let conn = setup_db();
        let (venue_id, user_id) = seed_venue_and_user(&conn);
        let booking_id = book(&conn, &venue_id, &user_id, "2025-07-01", "09:00", "10:00", 1);
        queries::set_booking_status(&conn, &booking_id, BookingStatus::Cancelled).unwrap();

        let free = is_court_available(&conn, &venue_id, date("2025-07-01"), time("09:00"), time("10:00"), 1).unwrap();
        assert!(free);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let conn = setup_db();
        let (venue_id, _) = seed_venue_and_user(&conn);

        let result = is_court_available(&conn, &venue_id, date("2025-07-01"), time("10:00"), time("09:00"), 1);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = is_court_available(&conn, &venue_id, date("2025-07-01"), time("10:00"), time("10:00"), 1);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_nonpositive_court_is_rejected() {
        let conn = setup_db();
        let (venue_id, _) = seed_venue_and_user(&conn);

        let result = is_court_available(&conn, &venue_id, date("2025-07-01"), time("09:00"), time("10:00"), 0);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
