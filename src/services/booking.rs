use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::db::queries::BookingDetail;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::availability;

pub struct BookingRequest {
    pub venue_id: String,
    pub user_id: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub court_number: i32,
    pub total_amount: f64,
}

/// Creates a booking in `pending` status after validating the request,
/// resolving venue and user, and checking the slot is free.
///
/// The availability check and the insert run against the same borrowed
/// connection; the caller holds the connection lock for the whole call, so
/// of two racing requests for one slot exactly one wins and the other
/// observes the winner's row and gets `Conflict`.
pub fn create_booking(conn: &Connection, req: &BookingRequest) -> Result<Booking, AppError> {
    if req.start_time >= req.end_time {
        return Err(AppError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    if req.court_number < 1 {
        return Err(AppError::Validation(
            "court_number must be at least 1".to_string(),
        ));
    }
    if req.total_amount < 0.0 {
        return Err(AppError::Validation(
            "total_amount must not be negative".to_string(),
        ));
    }

    let venue = queries::get_venue(conn, &req.venue_id)?
        .ok_or_else(|| AppError::NotFound(format!("venue not found: {}", req.venue_id)))?;

    if req.court_number > venue.total_courts {
        return Err(AppError::Validation(format!(
            "venue {} has courts 1..={}, got {}",
            venue.name, venue.total_courts, req.court_number
        )));
    }

    queries::get_user(conn, &req.user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user not found: {}", req.user_id)))?;

    let free = availability::is_court_available(
        conn,
        &req.venue_id,
        req.booking_date,
        req.start_time,
        req.end_time,
        req.court_number,
    )?;
    if !free {
        return Err(AppError::Conflict(
            "court is not available for the selected time slot".to_string(),
        ));
    }

    let booking = queries::insert_booking(
        conn,
        &req.venue_id,
        &req.user_id,
        req.booking_date,
        req.start_time,
        req.end_time,
        req.court_number,
        req.total_amount,
    )?;

    tracing::info!(
        booking_id = %booking.id,
        venue_id = %booking.venue_id,
        court = booking.court_number,
        date = %booking.booking_date,
        "booking created"
    );

    Ok(booking)
}

/// Records the payment reference and confirms the booking. Payment against
/// a cancelled booking is refused; re-attaching to an already confirmed
/// booking just updates the reference.
pub fn attach_payment(
    conn: &Connection,
    booking_id: &str,
    payment_id: &str,
) -> Result<Booking, AppError> {
    let booking = queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))?;

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        });
    }

    queries::set_booking_payment(conn, booking_id, payment_id)?;

    tracing::info!(booking_id = %booking_id, "payment attached, booking confirmed");

    let confirmed = queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))?;
    Ok(confirmed)
}

/// Moves a booking along the lifecycle. Only pending → confirmed,
/// pending → cancelled and confirmed → cancelled are legal; setting the
/// current status again is a no-op.
pub fn update_status(
    conn: &Connection,
    booking_id: &str,
    new_status: BookingStatus,
) -> Result<Booking, AppError> {
    let booking = queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))?;

    if booking.status == new_status {
        return Ok(booking);
    }

    if !booking.status.can_transition_to(new_status) {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: new_status,
        });
    }

    queries::set_booking_status(conn, booking_id, new_status)?;

    tracing::info!(
        booking_id = %booking_id,
        from = booking.status.as_str(),
        to = new_status.as_str(),
        "booking status updated"
    );

    let updated = queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))?;
    Ok(updated)
}

pub fn cancel_booking(conn: &Connection, booking_id: &str) -> Result<Booking, AppError> {
    update_status(conn, booking_id, BookingStatus::Cancelled)
}

pub fn get_booking(conn: &Connection, booking_id: &str) -> Result<BookingDetail, AppError> {
    queries::get_booking_detail(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))
}
