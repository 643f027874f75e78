//! Schema definition
//!
//! Tables stay schemaless; the definitions here exist for the unique
//! indexes that back duplicate detection. `DEFINE ... IF NOT EXISTS` makes
//! the whole block idempotent across restarts.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS customer SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS customer_email ON TABLE customer COLUMNS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS lead SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS lead_email ON TABLE lead COLUMNS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS opportunity SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS sales_order SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS order_number ON TABLE sales_order COLUMNS order_number UNIQUE;

    DEFINE TABLE IF NOT EXISTS invoice SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS invoice_number ON TABLE invoice COLUMNS invoice_number UNIQUE;

    DEFINE TABLE IF NOT EXISTS quotation SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS quote_number ON TABLE quotation COLUMNS quote_number UNIQUE;

    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS product_sku ON TABLE product COLUMNS sku UNIQUE;

    DEFINE TABLE IF NOT EXISTS account SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS account_code ON TABLE account COLUMNS code UNIQUE;

    DEFINE TABLE IF NOT EXISTS transaction SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS employee SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS employee_number ON TABLE employee COLUMNS employee_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS employee_email ON TABLE employee COLUMNS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS department SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS department_name ON TABLE department COLUMNS name UNIQUE;
    DEFINE INDEX IF NOT EXISTS department_code ON TABLE department COLUMNS code UNIQUE;

    DEFINE TABLE IF NOT EXISTS attendance SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS attendance_day ON TABLE attendance COLUMNS employee, date UNIQUE;

    DEFINE TABLE IF NOT EXISTS leave_request SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS payroll SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS payroll_period ON TABLE payroll COLUMNS employee, month, year UNIQUE;

    DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;
";

/// Apply index definitions; safe to run on every startup
pub async fn apply(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(SCHEMA).await?.check()?;
    Ok(())
}
