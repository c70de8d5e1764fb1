use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::CalendarSync;
use crate::models::Session;

pub struct GhlCalendarClient {
    base_url: String,
    api_key: String,
    location_id: String,
    calendar_id: String,
    client: reqwest::Client,
}

impl GhlCalendarClient {
    pub fn new(
        base_url: String,
        api_key: String,
        location_id: String,
        calendar_id: String,
    ) -> Self {
        Self {
            base_url,
            api_key,
            location_id,
            calendar_id,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct AppointmentResponse {
    id: String,
}

#[async_trait]
impl CalendarSync for GhlCalendarClient {
    async fn push_session(&self, session: &Session) -> anyhow::Result<String> {
        let url = format!("{}/appointments/", self.base_url);

        let body = serde_json::json!({
            "calendarId": self.calendar_id,
            "locationId": self.location_id,
            "title": session.title,
            "selectedSlot": format!("{}T{}:00", session.date, session.time),
            "durationMinutes": session.duration,
            "contactId": session.client_id,
            "notes": session.notes,
        });

        let response: AppointmentResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to reach GHL calendar API")?
            .error_for_status()
            .context("GHL calendar API returned error")?
            .json()
            .await
            .context("failed to decode GHL appointment response")?;

        Ok(response.id)
    }
}
