use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AvailabilityException, AvailabilityRule};
use crate::state::AppState;

// ── Rules ──

// GET /api/trainers/:trainer_id/rules
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<AvailabilityRule>>, AppError> {
    let db = state.db.lock().unwrap();
    let rules = queries::rules_for_trainer(&db, &trainer_id)?;
    Ok(Json(rules))
}

// POST /api/trainers/:trainer_id/rules
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Path(trainer_id): Path<String>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<AvailabilityRule>, AppError> {
    let rule = AvailabilityRule {
        id: Uuid::new_v4().to_string(),
        trainer_id,
        day_of_week: req.day_of_week,
        start_time: req.start_time,
        end_time: req.end_time,
        is_active: req.is_active,
    };
    rule.validate()?;

    let db = state.db.lock().unwrap();
    if rule.is_active && queries::active_rule_conflict(&db, &rule.trainer_id, rule.day_of_week, None)? {
        return Err(AppError::SlotConflict(format!(
            "trainer {} already has an active rule for weekday {}",
            rule.trainer_id, rule.day_of_week
        )));
    }
    queries::create_rule(&db, &rule)?;
    Ok(Json(rule))
}

// POST /api/rules/:id/update
#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub day_of_week: Option<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<Json<AvailabilityRule>, AppError> {
    let db = state.db.lock().unwrap();
    let mut rule = queries::get_rule_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("availability rule {id}")))?;

    if let Some(day_of_week) = req.day_of_week {
        rule.day_of_week = day_of_week;
    }
    if let Some(start_time) = req.start_time {
        rule.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        rule.end_time = end_time;
    }
    if let Some(is_active) = req.is_active {
        rule.is_active = is_active;
    }
    rule.validate()?;

    if rule.is_active
        && queries::active_rule_conflict(&db, &rule.trainer_id, rule.day_of_week, Some(&rule.id))?
    {
        return Err(AppError::SlotConflict(format!(
            "trainer {} already has an active rule for weekday {}",
            rule.trainer_id, rule.day_of_week
        )));
    }
    queries::update_rule(&db, &rule)?;
    Ok(Json(rule))
}

// POST /api/rules/:id/delete
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    if !queries::delete_rule(&db, &id)? {
        return Err(AppError::NotFound(format!("availability rule {id}")));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// ── Exceptions ──

// GET /api/trainers/:trainer_id/exceptions
pub async fn list_exceptions(
    State(state): State<Arc<AppState>>,
    Path(trainer_id): Path<String>,
) -> Result<Json<Vec<AvailabilityException>>, AppError> {
    let db = state.db.lock().unwrap();
    let exceptions = queries::exceptions_for_trainer(&db, &trainer_id)?;
    Ok(Json(exceptions))
}

// POST /api/trainers/:trainer_id/exceptions
#[derive(Deserialize)]
pub struct CreateExceptionRequest {
    pub date: String,
    #[serde(default)]
    pub is_blocked: bool,
    pub reason: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

pub async fn create_exception(
    State(state): State<Arc<AppState>>,
    Path(trainer_id): Path<String>,
    Json(req): Json<CreateExceptionRequest>,
) -> Result<Json<AvailabilityException>, AppError> {
    let exception = AvailabilityException {
        id: Uuid::new_v4().to_string(),
        trainer_id,
        date: req.date,
        is_blocked: req.is_blocked,
        reason: req.reason,
        start_time: req.start_time,
        end_time: req.end_time,
    };
    exception.validate()?;

    let db = state.db.lock().unwrap();
    if queries::exception_exists(&db, &exception.trainer_id, &exception.date)? {
        return Err(AppError::SlotConflict(format!(
            "trainer {} already has an exception on {}",
            exception.trainer_id, exception.date
        )));
    }
    queries::create_exception(&db, &exception)?;
    Ok(Json(exception))
}

// POST /api/exceptions/:id/delete
pub async fn delete_exception(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db.lock().unwrap();
    if !queries::delete_exception(&db, &id)? {
        return Err(AppError::NotFound(format!("availability exception {id}")));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
