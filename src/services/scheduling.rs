use chrono::Datelike;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::{minutes_to_time, time_to_minutes, validate_date, validate_time};

/// Candidate start times step forward on a fixed half-hour grid regardless of
/// the requested duration, so odd durations can leave an unusable gap at the
/// end of the window.
const SLOT_STEP_MINUTES: i64 = 30;

/// Compute the bookable start times for a trainer on a date.
///
/// Weekly rules are consulted by weekday; a blocking exception for the exact
/// date wins over any rule, and an unblocked exception with override times
/// replaces the rule's window. Candidates that would run past the window end
/// are dropped, as are candidates whose start matches an existing
/// non-cancelled session.
pub fn available_slots(
    conn: &Connection,
    trainer_id: &str,
    date: &str,
    duration_minutes: i64,
) -> Result<Vec<String>, AppError> {
    if duration_minutes <= 0 {
        return Err(AppError::InvalidInput(format!(
            "duration must be positive, got {duration_minutes}"
        )));
    }
    let parsed = validate_date(date)?;
    let day_of_week = parsed.weekday().num_days_from_sunday() as u8;

    let rules = queries::active_rules_for_day(conn, trainer_id, day_of_week)?;
    let Some(rule) = rules.first() else {
        return Ok(vec![]);
    };

    let exception = queries::exception_for_date(conn, trainer_id, date)?;
    let (window_start, window_end) = match &exception {
        Some(e) if e.is_blocked => return Ok(vec![]),
        Some(e) => match e.override_window() {
            Some((start, end)) => (start.to_string(), end.to_string()),
            None => (rule.start_time.clone(), rule.end_time.clone()),
        },
        None => (rule.start_time.clone(), rule.end_time.clone()),
    };

    let booked = queries::sessions_for_trainer_date(conn, trainer_id, date)?;

    let mut slots = vec![];
    let mut current = time_to_minutes(&window_start);
    let end = time_to_minutes(&window_end);

    while current + duration_minutes <= end {
        let candidate = minutes_to_time(current);
        if !booked.iter().any(|s| s.time == candidate) {
            slots.push(candidate);
        }
        current += SLOT_STEP_MINUTES;
    }

    Ok(slots)
}

/// Single arbitration point for booking writes. Both create and reschedule
/// run through here while the caller holds the store lock, so two requests
/// cannot claim the same slot.
///
/// `exclude_session_id` skips the session being rescheduled in the overlap
/// scan.
pub fn validate_booking(
    conn: &Connection,
    trainer_id: &str,
    date: &str,
    time: &str,
    duration_minutes: i64,
    exclude_session_id: Option<&str>,
) -> Result<(), AppError> {
    if duration_minutes <= 0 {
        return Err(AppError::InvalidInput(format!(
            "duration must be positive, got {duration_minutes}"
        )));
    }
    let parsed = validate_date(date)?;
    validate_time(time)?;

    let day_of_week = parsed.weekday().num_days_from_sunday() as u8;
    let rules = queries::active_rules_for_day(conn, trainer_id, day_of_week)?;
    let Some(rule) = rules.first() else {
        return Err(AppError::OutsideAvailability(format!(
            "trainer {trainer_id} has no availability on {date}"
        )));
    };

    let exception = queries::exception_for_date(conn, trainer_id, date)?;
    let (window_start, window_end) = match &exception {
        Some(e) if e.is_blocked => {
            return Err(AppError::OutsideAvailability(format!(
                "trainer {trainer_id} is blocked out on {date}"
            )));
        }
        Some(e) => match e.override_window() {
            Some((start, end)) => (start.to_string(), end.to_string()),
            None => (rule.start_time.clone(), rule.end_time.clone()),
        },
        None => (rule.start_time.clone(), rule.end_time.clone()),
    };

    let start = time_to_minutes(time);
    let end = start + duration_minutes;
    if start < time_to_minutes(&window_start) || end > time_to_minutes(&window_end) {
        return Err(AppError::OutsideAvailability(format!(
            "{time} (+{duration_minutes}min) falls outside {window_start}-{window_end}"
        )));
    }

    let booked = queries::sessions_for_trainer_date(conn, trainer_id, date)?;
    for session in &booked {
        if exclude_session_id == Some(session.id.as_str()) {
            continue;
        }
        let booked_start = time_to_minutes(&session.time);
        let booked_end = booked_start + session.duration;
        // Overlap: existing starts before proposed ends AND ends after proposed starts
        if booked_start < end && booked_end > start {
            return Err(AppError::SlotConflict(format!(
                "trainer {trainer_id} already has a session at {} on {date}",
                session.time
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{AvailabilityException, AvailabilityRule, DeliveryMode, Session, SessionStatus};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn add_rule(conn: &Connection, id: &str, day: u8, start: &str, end: &str) {
        queries::create_rule(
            conn,
            &AvailabilityRule {
                id: id.to_string(),
                trainer_id: "trainer-1".to_string(),
                day_of_week: day,
                start_time: start.to_string(),
                end_time: end.to_string(),
                is_active: true,
            },
        )
        .unwrap();
    }

    fn add_session(conn: &Connection, id: &str, date: &str, time: &str, status: SessionStatus) {
        queries::create_session(
            conn,
            &Session {
                id: id.to_string(),
                title: "Strength Training".to_string(),
                trainer_id: "trainer-1".to_string(),
                trainer_name: "Alex Carter".to_string(),
                client_id: "client-1".to_string(),
                client_name: "Demo User".to_string(),
                date: date.to_string(),
                time: time.to_string(),
                duration: 60,
                kind: DeliveryMode::InPerson,
                status,
                location: None,
                notes: None,
                price: None,
                session_type_id: "strength-60".to_string(),
            },
        )
        .unwrap();
    }

    // 2025-06-16 is a Monday

    #[test]
    fn test_full_open_day() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:00"));
        assert_eq!(slots.len(), 15);
        assert!(slots.contains(&"09:30".to_string()));
    }

    #[test]
    fn test_no_rule_for_weekday() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        // 2025-06-17 is a Tuesday
        let slots = available_slots(&conn, "trainer-1", "2025-06-17", 60).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_inactive_rule_ignored() {
        let conn = setup_db();
        queries::create_rule(
            &conn,
            &AvailabilityRule {
                id: "ar-1".to_string(),
                trainer_id: "trainer-1".to_string(),
                day_of_week: 1,
                start_time: "09:00".to_string(),
                end_time: "17:00".to_string(),
                is_active: false,
            },
        )
        .unwrap();

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_booked_start_excluded() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        add_session(&conn, "s1", "2025-06-16", "10:00", SessionStatus::Upcoming);

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"10:30".to_string()));
    }

    #[test]
    fn test_cancelled_session_does_not_block() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        add_session(&conn, "s1", "2025-06-16", "10:00", SessionStatus::Cancelled);

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert!(slots.contains(&"10:00".to_string()));
    }

    #[test]
    fn test_blocking_exception_wins() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        queries::create_exception(
            &conn,
            &AvailabilityException {
                id: "ae-1".to_string(),
                trainer_id: "trainer-1".to_string(),
                date: "2025-06-16".to_string(),
                is_blocked: true,
                reason: Some("Personal Day Off".to_string()),
                start_time: None,
                end_time: None,
            },
        )
        .unwrap();

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_override_exception_narrows_window() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        queries::create_exception(
            &conn,
            &AvailabilityException {
                id: "ae-1".to_string(),
                trainer_id: "trainer-1".to_string(),
                date: "2025-06-16".to_string(),
                is_blocked: false,
                reason: None,
                start_time: Some("10:00".to_string()),
                end_time: Some("12:00".to_string()),
            },
        )
        .unwrap();

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert_eq!(slots, vec!["10:00", "10:30", "11:00"]);
    }

    #[test]
    fn test_window_shorter_than_duration() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "09:45");

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 60).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_no_slot_runs_past_window_end() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        let slots = available_slots(&conn, "trainer-1", "2025-06-16", 45).unwrap();
        // last 45-minute candidate on the 30-minute grid is 16:00 (16:30+45 > 17:00)
        assert_eq!(slots.last().map(String::as_str), Some("16:00"));
        for slot in &slots {
            assert!(time_to_minutes(slot) + 45 <= time_to_minutes("17:00"));
        }
    }

    #[test]
    fn test_invalid_date_rejected() {
        let conn = setup_db();
        let err = available_slots(&conn, "trainer-1", "not-a-date", 60).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_booking_ok() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        assert!(validate_booking(&conn, "trainer-1", "2025-06-16", "10:00", 60, None).is_ok());
    }

    #[test]
    fn test_validate_booking_outside_window() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        let err = validate_booking(&conn, "trainer-1", "2025-06-16", "16:30", 60, None).unwrap_err();
        assert!(matches!(err, AppError::OutsideAvailability(_)));

        let err = validate_booking(&conn, "trainer-1", "2025-06-16", "08:00", 60, None).unwrap_err();
        assert!(matches!(err, AppError::OutsideAvailability(_)));
    }

    #[test]
    fn test_validate_booking_no_availability_day() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");

        let err = validate_booking(&conn, "trainer-1", "2025-06-17", "10:00", 60, None).unwrap_err();
        assert!(matches!(err, AppError::OutsideAvailability(_)));
    }

    #[test]
    fn test_validate_booking_overlap_conflict() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        add_session(&conn, "s1", "2025-06-16", "10:00", SessionStatus::Upcoming);

        // 10:30 overlaps 10:00-11:00
        let err = validate_booking(&conn, "trainer-1", "2025-06-16", "10:30", 60, None).unwrap_err();
        assert!(matches!(err, AppError::SlotConflict(_)));

        // adjacent is fine
        assert!(validate_booking(&conn, "trainer-1", "2025-06-16", "11:00", 60, None).is_ok());
    }

    #[test]
    fn test_validate_booking_excludes_own_session() {
        let conn = setup_db();
        add_rule(&conn, "ar-1", 1, "09:00", "17:00");
        add_session(&conn, "s1", "2025-06-16", "10:00", SessionStatus::Upcoming);

        // moving s1 within its own old window is not a self-conflict
        assert!(
            validate_booking(&conn, "trainer-1", "2025-06-16", "10:30", 60, Some("s1")).is_ok()
        );
    }
}
