use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A recurring weekly open-hours window for a trainer.
/// `day_of_week` is 0=Sunday .. 6=Saturday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: String,
    pub trainer_id: String,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

impl AvailabilityRule {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.day_of_week > 6 {
            return Err(AppError::InvalidInput(format!(
                "day_of_week out of range: {}",
                self.day_of_week
            )));
        }
        validate_time(&self.start_time)?;
        validate_time(&self.end_time)?;
        if self.start_time >= self.end_time {
            return Err(AppError::InvalidInput(format!(
                "start_time {} must be before end_time {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

/// A date-specific override layered atop the weekly rules. A blocked
/// exception removes the day entirely; an unblocked one replaces the rule's
/// window with its own start/end times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: String,
    pub trainer_id: String,
    pub date: String,
    pub is_blocked: bool,
    pub reason: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl AvailabilityException {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_date(&self.date)?;
        if self.is_blocked {
            return Ok(());
        }
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => {
                validate_time(start)?;
                validate_time(end)?;
                if start >= end {
                    return Err(AppError::InvalidInput(format!(
                        "override start {start} must be before end {end}"
                    )));
                }
                Ok(())
            }
            _ => Err(AppError::InvalidInput(
                "an unblocked exception needs both override start and end times".to_string(),
            )),
        }
    }

    /// The override window, when this exception carries one.
    pub fn override_window(&self) -> Option<(&str, &str)> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) if !self.is_blocked => Some((start, end)),
            _ => None,
        }
    }
}

pub fn validate_time(s: &str) -> Result<(), AppError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 || parts[0].len() != 2 || parts[1].len() != 2 {
        return Err(AppError::InvalidInput(format!("invalid time format: {s}")));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("invalid hour in: {s}")))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("invalid minute in: {s}")))?;
    if hour > 23 || minute > 59 {
        return Err(AppError::InvalidInput(format!("time out of range: {s}")));
    }
    Ok(())
}

pub fn validate_date(s: &str) -> Result<chrono::NaiveDate, AppError> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid date: {s}")))
}

/// Minutes since midnight for an already validated HH:MM string.
pub fn time_to_minutes(s: &str) -> i64 {
    let (hour, minute) = s.split_once(':').unwrap_or(("0", "0"));
    hour.parse::<i64>().unwrap_or(0) * 60 + minute.parse::<i64>().unwrap_or(0)
}

pub fn minutes_to_time(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(day: u8, start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            id: "ar-1".to_string(),
            trainer_id: "trainer-1".to_string(),
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_valid_rule() {
        assert!(rule(1, "09:00", "17:00").validate().is_ok());
    }

    #[test]
    fn test_rule_rejects_bad_day() {
        assert!(rule(7, "09:00", "17:00").validate().is_err());
    }

    #[test]
    fn test_rule_rejects_inverted_window() {
        assert!(rule(1, "17:00", "09:00").validate().is_err());
        assert!(rule(1, "09:00", "09:00").validate().is_err());
    }

    #[test]
    fn test_rule_rejects_bad_time() {
        assert!(rule(1, "25:00", "26:00").validate().is_err());
        assert!(rule(1, "9:00", "17:00").validate().is_err());
        assert!(rule(1, "nine", "17:00").validate().is_err());
    }

    #[test]
    fn test_blocked_exception_ignores_override_times() {
        let ex = AvailabilityException {
            id: "ae-1".to_string(),
            trainer_id: "trainer-1".to_string(),
            date: "2025-10-15".to_string(),
            is_blocked: true,
            reason: Some("Personal Day Off".to_string()),
            start_time: None,
            end_time: None,
        };
        assert!(ex.validate().is_ok());
        assert!(ex.override_window().is_none());
    }

    #[test]
    fn test_unblocked_exception_requires_both_times() {
        let mut ex = AvailabilityException {
            id: "ae-2".to_string(),
            trainer_id: "trainer-1".to_string(),
            date: "2025-10-16".to_string(),
            is_blocked: false,
            reason: None,
            start_time: Some("10:00".to_string()),
            end_time: None,
        };
        assert!(ex.validate().is_err());

        ex.end_time = Some("14:00".to_string());
        assert!(ex.validate().is_ok());
        assert_eq!(ex.override_window(), Some(("10:00", "14:00")));
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-10-15").is_ok());
        assert!(validate_date("2025-13-01").is_err());
        assert!(validate_date("next tuesday").is_err());
    }

    #[test]
    fn test_time_minute_conversion() {
        assert_eq!(time_to_minutes("09:30"), 570);
        assert_eq!(minutes_to_time(570), "09:30");
        assert_eq!(minutes_to_time(960), "16:00");
    }
}
