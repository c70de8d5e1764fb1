use chrono::{Duration, NaiveDate, NaiveTime};

use crate::errors::AppError;
use crate::models::Session;

/// Render a session as a single-event iCalendar file for import into the
/// client's own calendar.
pub fn generate_ics(session: &Session) -> Result<String, AppError> {
    let date = NaiveDate::parse_from_str(&session.date, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid session date: {}", session.date)))?;
    let time = NaiveTime::parse_from_str(&session.time, "%H:%M")
        .map_err(|_| AppError::InvalidInput(format!("invalid session time: {}", session.time)))?;

    let start = date.and_time(time);
    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = (start + Duration::minutes(session.duration))
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@trainu", session.id);

    let summary = format!("{} with {}", session.title, session.trainer_name);
    let description = session.notes.as_deref().unwrap_or("No additional notes");
    let location = match (&session.kind, &session.location) {
        (crate::models::DeliveryMode::Virtual, _) => "Virtual session".to_string(),
        (_, Some(loc)) => loc.clone(),
        (_, None) => String::new(),
    };

    Ok(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//TrainU//Calendar Service//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         LOCATION:{location}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
}
