use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::admin::check_auth;
use crate::handlers::bookings::{parse_date, BookingResponse};
use crate::models::Venue;
use crate::state::AppState;

#[derive(Serialize)]
pub struct VenueResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub sport_type: Option<String>,
    pub total_courts: i32,
    pub price_per_hour: f64,
    pub manager_id: Option<String>,
    pub active: bool,
}

impl From<Venue> for VenueResponse {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id,
            name: v.name,
            location: v.location,
            sport_type: v.sport_type,
            total_courts: v.total_courts,
            price_per_hour: v.price_per_hour,
            manager_id: v.manager_id,
            active: v.active,
        }
    }
}

// POST /api/venues
#[derive(Deserialize)]
pub struct CreateVenueRequest {
    pub name: String,
    pub location: String,
    pub sport_type: Option<String>,
    pub total_courts: i32,
    #[serde(default)]
    pub price_per_hour: f64,
    pub manager_id: Option<String>,
}

pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateVenueRequest>,
) -> Result<(StatusCode, Json<VenueResponse>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    // Courts are numbered 1..=total_courts; a venue without courts is not bookable.
    if body.total_courts < 1 {
        return Err(AppError::Validation(
            "total_courts must be at least 1".to_string(),
        ));
    }

    let venue = {
        let db = state.db.lock().unwrap();

        if queries::venue_name_exists(&db, &body.name)? {
            return Err(AppError::Conflict(format!(
                "a venue named {} already exists",
                body.name
            )));
        }

        queries::insert_venue(
            &db,
            &body.name,
            &body.location,
            body.sport_type.as_deref(),
            body.total_courts,
            body.price_per_hour,
            body.manager_id.as_deref(),
        )?
    };

    tracing::info!(venue_id = %venue.id, name = %venue.name, "venue created");

    Ok((StatusCode::CREATED, Json(venue.into())))
}

// GET /api/venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let venues = {
        let db = state.db.lock().unwrap();
        queries::list_venues(&db)?
    };

    Ok(Json(venues.into_iter().map(VenueResponse::from).collect()))
}

// GET /api/venues/search
#[derive(Deserialize)]
pub struct VenueSearchQuery {
    pub name: Option<String>,
    pub location: Option<String>,
    pub sport_type: Option<String>,
}

fn matches(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}

pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VenueSearchQuery>,
) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let venues = {
        let db = state.db.lock().unwrap();
        queries::list_venues(&db)?
    };

    let filtered: Vec<VenueResponse> = venues
        .into_iter()
        .filter(|v| matches(&v.name, &query.name))
        .filter(|v| matches(&v.location, &query.location))
        .filter(|v| matches(v.sport_type.as_deref().unwrap_or(""), &query.sport_type))
        .map(VenueResponse::from)
        .collect();

    Ok(Json(filtered))
}

// GET /api/venues/:id
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VenueResponse>, AppError> {
    let venue = {
        let db = state.db.lock().unwrap();
        queries::get_venue(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("venue not found: {id}")))?;

    Ok(Json(venue.into()))
}

// GET /api/venues/:id/bookings?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct VenueBookingsQuery {
    pub date: String,
}

pub async fn venue_bookings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<VenueBookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let date = parse_date(&query.date)?;

    let bookings = {
        let db = state.db.lock().unwrap();

        queries::get_venue(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("venue not found: {id}")))?;

        queries::bookings_for_venue_date(&db, &id, date)?
    };

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}
