use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub ghl_base_url: String,
    pub ghl_api_key: String,
    pub ghl_location_id: String,
    pub ghl_calendar_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "trainu.db".to_string()),
            ghl_base_url: env::var("GHL_BASE_URL")
                .unwrap_or_else(|_| "https://rest.gohighlevel.com/v1".to_string()),
            ghl_api_key: env::var("GHL_API_KEY").unwrap_or_default(),
            ghl_location_id: env::var("GHL_LOCATION_ID").unwrap_or_default(),
            ghl_calendar_id: env::var("GHL_CALENDAR_ID").unwrap_or_default(),
        }
    }

    /// The external calendar sync is only wired up when credentials are set.
    pub fn ghl_configured(&self) -> bool {
        !self.ghl_api_key.is_empty() && !self.ghl_calendar_id.is_empty()
    }
}
