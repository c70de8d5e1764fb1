pub mod availability;
pub mod calendar;
pub mod health;
pub mod sessions;
pub mod slots;
pub mod sync;
