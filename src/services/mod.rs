pub mod calendar;
pub mod lifecycle;
pub mod scheduling;
pub mod sync;
