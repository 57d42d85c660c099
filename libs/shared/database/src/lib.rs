pub mod postgrest;
pub mod state;

pub use postgrest::{DbError, PostgrestClient};
pub use state::AppState;
