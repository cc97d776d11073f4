use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bookings::BookingResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

// POST /api/users
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }

    let user = {
        let db = state.db.lock().unwrap();

        if queries::get_user_by_username(&db, &username)?.is_some() {
            return Err(AppError::Conflict(format!(
                "username {username} is already taken"
            )));
        }

        queries::insert_user(&db, &username)?
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

// GET /api/users/:id/bookings
pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();

        queries::get_user(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("user not found: {id}")))?;

        queries::bookings_for_user(&db, &id)?
    };

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}
