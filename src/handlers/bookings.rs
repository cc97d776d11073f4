use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Booking;
use crate::services::{availability, booking, events};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub venue_id: String,
    pub user_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub court_number: i32,
    pub total_amount: f64,
    pub status: String,
    pub payment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            venue_id: b.venue_id,
            user_id: b.user_id,
            booking_date: b.booking_date.format("%Y-%m-%d").to_string(),
            start_time: b.start_time.format("%H:%M").to_string(),
            end_time: b.end_time.format("%H:%M").to_string(),
            court_number: b.court_number,
            total_amount: b.total_amount,
            status: b.status.as_str().to_string(),
            payment_id: b.payment_id,
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date (expected YYYY-MM-DD): {s}")))
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid time (expected HH:MM): {s}")))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub venue_id: String,
    pub user_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub court_number: i32,
    pub total_amount: f64,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let request = booking::BookingRequest {
        venue_id: body.venue_id,
        user_id: body.user_id,
        booking_date: parse_date(&body.booking_date)?,
        start_time: parse_time(&body.start_time)?,
        end_time: parse_time(&body.end_time)?,
        court_number: body.court_number,
        total_amount: body.total_amount,
    };

    // One lock scope covers the availability check and the insert.
    let created = {
        let db = state.db.lock().unwrap();
        booking::create_booking(&db, &request)?
    };

    events::record_booking_event(&state, &created, "created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

// GET /api/bookings/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub venue_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub court_number: i32,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date(&query.date)?;
    let start = parse_time(&query.start_time)?;
    let end = parse_time(&query.end_time)?;

    let available = {
        let db = state.db.lock().unwrap();
        availability::is_court_available(&db, &query.venue_id, date, start, end, query.court_number)?
    };

    Ok(Json(serde_json::json!({ "available": available })))
}

// GET /api/bookings/:id
#[derive(Serialize)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub venue_name: String,
    pub username: String,
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let detail = {
        let db = state.db.lock().unwrap();
        booking::get_booking(&db, &id)?
    };

    Ok(Json(BookingDetailResponse {
        booking: detail.booking.into(),
        venue_name: detail.venue_name,
        username: detail.username,
    }))
}

// POST /api/bookings/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub user_id: String,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let cancelled = {
        let db = state.db.lock().unwrap();

        let existing = queries::get_booking(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("booking not found: {id}")))?;
        if existing.user_id != body.user_id {
            return Err(AppError::Forbidden(
                "only the booking holder may cancel it".to_string(),
            ));
        }

        booking::cancel_booking(&db, &id)?
    };

    events::record_booking_event(&state, &cancelled, "cancelled");

    Ok(Json(cancelled.into()))
}

// POST /api/bookings/:id/payment
#[derive(Deserialize)]
pub struct PaymentRequest {
    pub payment_id: String,
}

pub async fn attach_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    if body.payment_id.trim().is_empty() {
        return Err(AppError::Validation("payment_id is required".to_string()));
    }

    let confirmed = {
        let db = state.db.lock().unwrap();
        booking::attach_payment(&db, &id, body.payment_id.trim())?
    };

    events::record_booking_event(&state, &confirmed, "confirmed");

    Ok(Json(confirmed.into()))
}
