pub mod auth;
pub mod error;
pub mod pagination;

pub use error::AppError;
pub use pagination::{Paginated, Pagination};
