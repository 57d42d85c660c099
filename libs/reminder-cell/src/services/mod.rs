pub mod mailer;
pub mod sweep;

pub use mailer::{HttpMailer, MailError, Mailer};
pub use sweep::ReminderSweepService;
