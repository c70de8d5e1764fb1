use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{DeliveryMode, Session, SessionFilter, SessionStatus};
use crate::services::{lifecycle, scheduling};
use crate::state::AppState;

// GET /api/sessions
#[derive(Deserialize)]
pub struct SessionsQuery {
    pub trainer_id: Option<String>,
    pub client_id: Option<String>,
    /// Comma-separated status list, e.g. `upcoming,completed`.
    pub status: Option<String>,
    /// Comma-separated delivery modes, e.g. `in_person,virtual`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn parse_status_list(raw: &str) -> Result<Vec<SessionStatus>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "upcoming" => Ok(SessionStatus::Upcoming),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no_show" => Ok(SessionStatus::NoShow),
            other => Err(AppError::InvalidInput(format!("unknown status: {other}"))),
        })
        .collect()
}

fn parse_kind_list(raw: &str) -> Result<Vec<DeliveryMode>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "in_person" => Ok(DeliveryMode::InPerson),
            "virtual" => Ok(DeliveryMode::Virtual),
            other => Err(AppError::InvalidInput(format!(
                "unknown session type: {other}"
            ))),
        })
        .collect()
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<Session>>, AppError> {
    let filter = SessionFilter {
        trainer_id: query.trainer_id,
        client_id: query.client_id,
        status: query.status.as_deref().map(parse_status_list).transpose()?,
        kind: query.kind.as_deref().map(parse_kind_list).transpose()?,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    let db = state.db.lock().unwrap();
    let sessions = queries::list_sessions(&db, &filter)?;
    Ok(Json(sessions))
}

// POST /api/sessions
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub trainer_id: String,
    pub trainer_name: String,
    pub client_id: String,
    pub client_name: String,
    pub date: String,
    pub time: String,
    pub duration: i64,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: DeliveryMode,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub session_type_id: String,
}

fn default_kind() -> DeliveryMode {
    DeliveryMode::InPerson
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();

    // Arbitration happens here, under the store lock.
    scheduling::validate_booking(&db, &req.trainer_id, &req.date, &req.time, req.duration, None)?;

    let session = Session {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        trainer_id: req.trainer_id,
        trainer_name: req.trainer_name,
        client_id: req.client_id,
        client_name: req.client_name,
        date: req.date,
        time: req.time,
        duration: req.duration,
        kind: req.kind,
        status: SessionStatus::Upcoming,
        location: req.location,
        notes: req.notes,
        price: req.price,
        session_type_id: req.session_type_id,
    };
    queries::create_session(&db, &session)?;
    tracing::info!(session_id = %session.id, trainer_id = %session.trainer_id, "session booked");
    Ok(Json(session))
}

// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();
    let session = queries::get_session_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))?;
    Ok(Json(session))
}

// POST /api/sessions/:id/update
//
// Partial field merge. Status is deliberately absent: it only changes
// through the lifecycle endpoints.
#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub trainer_name: Option<String>,
    pub client_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<DeliveryMode>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub session_type_id: Option<String>,
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();
    let mut session = queries::get_session_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))?;

    let reschedules = req.date.is_some() || req.time.is_some() || req.duration.is_some();

    if let Some(date) = &req.date {
        crate::models::availability::validate_date(date)?;
        session.date = date.clone();
    }
    if let Some(time) = &req.time {
        crate::models::availability::validate_time(time)?;
        session.time = time.clone();
    }
    if let Some(duration) = req.duration {
        if duration <= 0 {
            return Err(AppError::InvalidInput(format!(
                "duration must be positive, got {duration}"
            )));
        }
        session.duration = duration;
    }

    // Moving the session in time goes through the same arbitration as
    // create and reschedule, still under the store lock.
    if reschedules {
        scheduling::validate_booking(
            &db,
            &session.trainer_id,
            &session.date,
            &session.time,
            session.duration,
            Some(&id),
        )?;
    }
    if let Some(title) = req.title {
        session.title = title;
    }
    if let Some(trainer_name) = req.trainer_name {
        session.trainer_name = trainer_name;
    }
    if let Some(client_name) = req.client_name {
        session.client_name = client_name;
    }
    if let Some(kind) = req.kind {
        session.kind = kind;
    }
    if req.location.is_some() {
        session.location = req.location;
    }
    if req.notes.is_some() {
        session.notes = req.notes;
    }
    if req.price.is_some() {
        session.price = req.price;
    }
    if let Some(session_type_id) = req.session_type_id {
        session.session_type_id = session_type_id;
    }

    queries::update_session(&db, &session)?;
    Ok(Json(session))
}

// POST /api/sessions/:id/delete
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    if !queries::delete_session(&db, &id)? {
        return Err(AppError::NotFound(format!("session {id}")));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// POST /api/sessions/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<Session>, AppError> {
    let reason = body.and_then(|Json(req)| req.reason);
    let db = state.db.lock().unwrap();
    let session = lifecycle::cancel_session(&db, &id, reason)?;
    Ok(Json(session))
}

// POST /api/sessions/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

pub async fn reschedule_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();
    let session = lifecycle::reschedule_session(&db, &id, &req.date, &req.time)?;
    Ok(Json(session))
}

// POST /api/sessions/:id/complete
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();
    let session = lifecycle::complete_session(&db, &id)?;
    Ok(Json(session))
}

// POST /api/sessions/:id/no-show
pub async fn mark_no_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let db = state.db.lock().unwrap();
    let session = lifecycle::mark_no_show(&db, &id)?;
    Ok(Json(session))
}
