use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Session, SessionStatus};
use crate::services::scheduling;

fn load_session(conn: &Connection, id: &str) -> Result<Session, AppError> {
    queries::get_session_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

fn transition(
    conn: &Connection,
    id: &str,
    next: SessionStatus,
) -> Result<Session, AppError> {
    let mut session = load_session(conn, id)?;

    if !session.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: session.status.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }

    session.status = next;
    queries::update_session(conn, &session)?;
    tracing::info!(session_id = %id, status = next.as_str(), "session transitioned");
    Ok(session)
}

/// Cancel keeps the record (delete is a separate operation) and stores the
/// optional reason in the notes field. Cancelling twice is a no-op.
pub fn cancel_session(
    conn: &Connection,
    id: &str,
    reason: Option<String>,
) -> Result<Session, AppError> {
    let mut session = load_session(conn, id)?;

    if !session.status.can_transition_to(SessionStatus::Cancelled) {
        return Err(AppError::InvalidTransition {
            from: session.status.as_str().to_string(),
            to: SessionStatus::Cancelled.as_str().to_string(),
        });
    }

    session.status = SessionStatus::Cancelled;
    if reason.is_some() {
        session.notes = reason;
    }
    queries::update_session(conn, &session)?;
    tracing::info!(session_id = %id, "session cancelled");
    Ok(session)
}

pub fn complete_session(conn: &Connection, id: &str) -> Result<Session, AppError> {
    transition(conn, id, SessionStatus::Completed)
}

pub fn mark_no_show(conn: &Connection, id: &str) -> Result<Session, AppError> {
    transition(conn, id, SessionStatus::NoShow)
}

/// Move a session to a new date/time. The target slot is revalidated the same
/// way a fresh booking is, with the session itself excluded from the overlap
/// scan. Status is unchanged.
pub fn reschedule_session(
    conn: &Connection,
    id: &str,
    new_date: &str,
    new_time: &str,
) -> Result<Session, AppError> {
    let mut session = load_session(conn, id)?;

    if !session.status.can_reschedule() {
        return Err(AppError::InvalidTransition {
            from: session.status.as_str().to_string(),
            to: "upcoming".to_string(),
        });
    }

    scheduling::validate_booking(
        conn,
        &session.trainer_id,
        new_date,
        new_time,
        session.duration,
        Some(id),
    )?;

    session.date = new_date.to_string();
    session.time = new_time.to_string();
    queries::update_session(conn, &session)?;
    tracing::info!(session_id = %id, date = new_date, time = new_time, "session rescheduled");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{AvailabilityRule, DeliveryMode};

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        // Monday and Tuesday 09:00-17:00
        for (id, day) in [("ar-1", 1u8), ("ar-2", 2u8)] {
            queries::create_rule(
                &conn,
                &AvailabilityRule {
                    id: id.to_string(),
                    trainer_id: "trainer-1".to_string(),
                    day_of_week: day,
                    start_time: "09:00".to_string(),
                    end_time: "17:00".to_string(),
                    is_active: true,
                },
            )
            .unwrap();
        }
        conn
    }

    fn seed_session(conn: &Connection, id: &str) {
        queries::create_session(
            conn,
            &Session {
                id: id.to_string(),
                title: "HIIT Bootcamp".to_string(),
                trainer_id: "trainer-1".to_string(),
                trainer_name: "Riley Nguyen".to_string(),
                client_id: "client-1".to_string(),
                client_name: "Demo User".to_string(),
                date: "2025-06-16".to_string(),
                time: "10:00".to_string(),
                duration: 60,
                kind: DeliveryMode::InPerson,
                status: SessionStatus::Upcoming,
                location: None,
                notes: None,
                price: Some(60.0),
                session_type_id: "hiit-45".to_string(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_cancel_sets_status_and_reason() {
        let conn = setup_db();
        seed_session(&conn, "s1");

        let session = cancel_session(&conn, "s1", Some("client sick".to_string())).unwrap();
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert_eq!(session.notes.as_deref(), Some("client sick"));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let conn = setup_db();
        seed_session(&conn, "s1");

        cancel_session(&conn, "s1", None).unwrap();
        let again = cancel_session(&conn, "s1", None).unwrap();
        assert_eq!(again.status, SessionStatus::Cancelled);
    }

    #[test]
    fn test_complete_and_no_show() {
        let conn = setup_db();
        seed_session(&conn, "s1");
        seed_session(&conn, "s2");

        assert_eq!(
            complete_session(&conn, "s1").unwrap().status,
            SessionStatus::Completed
        );
        assert_eq!(
            mark_no_show(&conn, "s2").unwrap().status,
            SessionStatus::NoShow
        );
    }

    #[test]
    fn test_terminal_states_are_guarded() {
        let conn = setup_db();
        seed_session(&conn, "s1");
        complete_session(&conn, "s1").unwrap();

        let err = mark_no_show(&conn, "s1").unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let err = cancel_session(&conn, "s1", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_reschedule_moves_fields_keeps_status() {
        let conn = setup_db();
        seed_session(&conn, "s1");

        let session = reschedule_session(&conn, "s1", "2025-06-17", "14:00").unwrap();
        assert_eq!(session.date, "2025-06-17");
        assert_eq!(session.time, "14:00");
        assert_eq!(session.status, SessionStatus::Upcoming);
    }

    #[test]
    fn test_reschedule_after_no_show_rejected() {
        let conn = setup_db();
        seed_session(&conn, "s1");
        mark_no_show(&conn, "s1").unwrap();

        let err = reschedule_session(&conn, "s1", "2025-06-17", "14:00").unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        // fields untouched
        let session = queries::get_session_by_id(&conn, "s1").unwrap().unwrap();
        assert_eq!(session.date, "2025-06-16");
        assert_eq!(session.status, SessionStatus::NoShow);
    }

    #[test]
    fn test_reschedule_into_busy_slot_rejected() {
        let conn = setup_db();
        seed_session(&conn, "s1");
        queries::create_session(
            &conn,
            &Session {
                id: "s2".to_string(),
                title: "Yoga Flow".to_string(),
                trainer_id: "trainer-1".to_string(),
                trainer_name: "Riley Nguyen".to_string(),
                client_id: "client-2".to_string(),
                client_name: "Other Client".to_string(),
                date: "2025-06-17".to_string(),
                time: "14:00".to_string(),
                duration: 60,
                kind: DeliveryMode::Virtual,
                status: SessionStatus::Upcoming,
                location: None,
                notes: None,
                price: None,
                session_type_id: "yoga-60".to_string(),
            },
        )
        .unwrap();

        let err = reschedule_session(&conn, "s1", "2025-06-17", "14:30").unwrap_err();
        assert!(matches!(err, AppError::SlotConflict(_)));
    }

    #[test]
    fn test_reschedule_within_own_slot_allowed() {
        let conn = setup_db();
        seed_session(&conn, "s1");

        // shifting 30 minutes overlaps the old position only
        let session = reschedule_session(&conn, "s1", "2025-06-16", "10:30").unwrap();
        assert_eq!(session.time, "10:30");
    }

    #[test]
    fn test_operations_on_missing_session() {
        let conn = setup_db();
        assert!(matches!(
            cancel_session(&conn, "ghost", None).unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            complete_session(&conn, "ghost").unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            reschedule_session(&conn, "ghost", "2025-06-16", "10:00").unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
