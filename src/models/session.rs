use serde::{Deserialize, Serialize};

/// One scheduled or past training appointment between a trainer and a client.
/// Dates are ISO `YYYY-MM-DD` strings and start times are `HH:MM`, matching
/// the wire format used by calendar clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub trainer_id: String,
    pub trainer_name: String,
    pub client_id: String,
    pub client_name: String,
    pub date: String,
    pub time: String,
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: DeliveryMode,
    pub status: SessionStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub session_type_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    InPerson,
    Virtual,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::InPerson => "in_person",
            DeliveryMode::Virtual => "virtual",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "virtual" => DeliveryMode::Virtual,
            _ => DeliveryMode::InPerson,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => SessionStatus::InProgress,
            "completed" => SessionStatus::Completed,
            "cancelled" => SessionStatus::Cancelled,
            "no_show" => SessionStatus::NoShow,
            _ => SessionStatus::Upcoming,
        }
    }

    /// `completed`, `cancelled` and `no_show` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::NoShow
        )
    }

    /// Transition table for the session lifecycle. Cancelling an already
    /// cancelled session is permitted so that cancel is idempotent.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Upcoming, InProgress) => true,
            (Upcoming, Completed) | (Upcoming, Cancelled) | (Upcoming, NoShow) => true,
            (InProgress, Completed) | (InProgress, Cancelled) | (InProgress, NoShow) => true,
            (Cancelled, Cancelled) => true,
            _ => false,
        }
    }

    /// Rescheduling keeps the status; only a not-yet-started session may move.
    pub fn can_reschedule(&self) -> bool {
        matches!(self, SessionStatus::Upcoming)
    }
}

/// Composite AND filter over the session collection. Absent fields impose no
/// constraint; date bounds are inclusive and compare ISO strings.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub trainer_id: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<Vec<SessionStatus>>,
    pub kind: Option<Vec<DeliveryMode>>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}
