use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::sync::CalendarSync;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    /// None when no external calendar credentials are configured; sync
    /// requests then fail with a backend-unavailable error.
    pub sync: Option<Box<dyn CalendarSync>>,
}
