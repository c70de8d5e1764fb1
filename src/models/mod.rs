pub mod availability;
pub mod session;

pub use availability::{AvailabilityException, AvailabilityRule};
pub use session::{DeliveryMode, Session, SessionFilter, SessionStatus};
