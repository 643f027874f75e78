//! Shared infrastructure: errors, pagination, logging

pub mod error;
pub mod logger;
pub mod pagination;

pub use error::{AppError, AppResult, ErrorBody};
pub use pagination::{Page, PageParams};
