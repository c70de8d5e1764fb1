pub mod ghl;

use async_trait::async_trait;

use crate::models::Session;

/// External calendar backend. The production implementation talks to
/// GoHighLevel; tests substitute a mock.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    /// Push a session to the remote calendar, returning the remote
    /// appointment id.
    async fn push_session(&self, session: &Session) -> anyhow::Result<String>;
}
