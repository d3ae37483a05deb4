//! Calendar events and daily punch-in.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use mindforge_core::CalendarEvent;

use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct EventBody {
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub schedule: String,
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<EventBody>,
) -> Result<(StatusCode, Json<CalendarEvent>), ApiError> {
    let date = parse_date(&body.date)?;
    if body.schedule.trim().is_empty() {
        return Err(ApiError::BadRequest("schedule is required".to_string()));
    }
    let event = state
        .db
        .events
        .create(user.id(), date, body.schedule.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    Ok(Json(state.db.events.list_for_user(user.id()).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.events.delete_for_user(user.id(), id).await? {
        return Err(ApiError::NotFound(format!("event {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}

/// Path variants must name the caller.
fn check_path_user(user: AuthUser, path_user_id: i64) -> Result<(), ApiError> {
    if user.id() != path_user_id {
        return Err(ApiError::Forbidden(
            "cannot access another user's punch records".to_string(),
        ));
    }
    Ok(())
}

/// Record today's (UTC) punch. Punching twice a day is a successful no-op.
pub async fn punch(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let today = Utc::now().date_naive();
    let recorded = state.db.punches.punch(user.id(), today).await?;
    Ok(Json(json!({
        "success": true,
        "date": today,
        "alreadyPunched": !recorded,
    })))
}

pub async fn punch_for(
    state: State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    check_path_user(user, user_id)?;
    punch(state, user).await
}

pub async fn punch_records(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    Ok(Json(state.db.punches.list_dates(user.id()).await?))
}

pub async fn punch_records_for(
    state: State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    check_path_user(user, user_id)?;
    punch_records(state, user).await
}
