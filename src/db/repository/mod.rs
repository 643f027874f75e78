//! Repository module
//!
//! One repository per entity over a shared [`BaseRepository`]. All IDs use
//! the "table:id" string convention via `surrealdb::RecordId`.

pub mod attendance;
pub mod customer;
pub mod department;
pub mod employee;
pub mod finance;
pub mod invoice;
pub mod lead;
pub mod leave_request;
pub mod opportunity;
pub mod payroll;
pub mod product;
pub mod quotation;
pub mod sales_order;
pub mod sequence;
pub mod user;

pub use attendance::AttendanceRepository;
pub use customer::CustomerRepository;
pub use department::DepartmentRepository;
pub use employee::EmployeeRepository;
pub use finance::FinanceRepository;
pub use invoice::InvoiceRepository;
pub use lead::LeadRepository;
pub use leave_request::LeaveRequestRepository;
pub use opportunity::OpportunityRepository;
pub use payroll::PayrollRepository;
pub use product::ProductRepository;
pub use quotation::QuotationRepository;
pub use sales_order::SalesOrderRepository;
pub use sequence::SequenceRepository;
pub use user::UserRepository;

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as "already contains" in the
        // engine error text
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Strip a "table:" prefix so handlers may pass either form
pub(crate) fn record_key<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Row shape of `SELECT count() AS total ... GROUP ALL`
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub total: u64,
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_strips_matching_table_only() {
        assert_eq!(record_key("invoice", "invoice:abc"), "abc");
        assert_eq!(record_key("invoice", "abc"), "abc");
        assert_eq!(record_key("invoice", "customer:abc"), "customer:abc");
    }
}
