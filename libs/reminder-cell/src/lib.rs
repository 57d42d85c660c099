pub mod models;
pub mod scheduler;
pub mod services;

pub use models::*;
pub use scheduler::start_reminder_scheduler;
