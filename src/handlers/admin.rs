use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bookings::BookingResponse;
use crate::models::BookingStatus;
use crate::services::{booking, events, stats};
use crate::state::AppState;

pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
pub async fn all_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::all_bookings(&db)?
    };

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

fn parse_status_strict(s: &str) -> Result<BookingStatus, AppError> {
    match s {
        "pending" => Ok(BookingStatus::Pending),
        "confirmed" => Ok(BookingStatus::Confirmed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(AppError::Validation(format!("unknown status: {other}"))),
    }
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let new_status = parse_status_strict(&body.status)?;

    let (updated, changed) = {
        let db = state.db.lock().unwrap();

        let before = queries::get_booking(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("booking not found: {id}")))?;
        let updated = booking::update_status(&db, &id, new_status)?;
        (updated, before.status != new_status)
    };

    if changed {
        let kind = match new_status {
            BookingStatus::Confirmed => Some("confirmed"),
            BookingStatus::Cancelled => Some("cancelled"),
            BookingStatus::Pending => None,
        };
        if let Some(kind) = kind {
            events::record_booking_event(&state, &updated, kind);
        }
    }

    Ok(Json(updated.into()))
}

// GET /api/admin/stats?scope=admin|manager
#[derive(Deserialize)]
pub struct StatsQuery {
    pub scope: Option<String>,
}

pub async fn booking_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<stats::BookingStats>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let scope = match query.scope.as_deref() {
        None | Some("admin") => stats::StatsScope::Admin,
        Some("manager") => stats::StatsScope::Manager,
        Some(other) => {
            return Err(AppError::Validation(format!("unknown stats scope: {other}")));
        }
    };

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::all_bookings(&db)?
    };

    Ok(Json(stats::compute_stats(&bookings, scope)))
}

// GET /api/admin/manager/:manager_id/bookings
pub async fn manager_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(manager_id): Path<String>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::bookings_for_manager(&db, &manager_id)?
    };

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

// GET /api/admin/events — SSE stream of booking lifecycle events
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
    pub last_id: Option<i64>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    let token = query.token.as_deref().unwrap_or("");
    if token != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    let last_id = query.last_id.unwrap_or(0);

    // Catch up on missed events from the durable feed
    let catchup_events = {
        let db = state.db.lock().unwrap();
        queries::get_booking_events_since(&db, last_id).unwrap_or_default()
    };

    let rx = state.events_tx.subscribe();

    let catchup_stream = tokio_stream::iter(catchup_events.into_iter().map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("booking_event"))
    }));

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("booking_event")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
