//! Invoice payment reconciliation
//!
//! Derives `amount_paid`, `balance` and the status transition from the
//! payment list. Status rules:
//!
//! - balance <= 0 with a non-zero total -> `paid`
//! - any payment recorded -> `partially_paid`
//! - past due date -> `overdue`, drafts included
//! - otherwise the current status is kept
//!
//! Cancelled and void are terminal and short-circuit all of the above.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{to_decimal, to_f64};
use crate::db::models::{InvoiceStatus, Payment};

/// Result of reconciling an invoice against its payments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub amount_paid: f64,
    pub balance: f64,
    pub status: InvoiceStatus,
}

/// Sum payment amounts with precise arithmetic
pub fn sum_payments(payments: &[Payment]) -> Decimal {
    payments.iter().map(|p| to_decimal(p.amount)).sum()
}

/// Reconcile an invoice's money fields and status
///
/// `now` is injected so the overdue rule is testable.
pub fn reconcile(
    total_amount: f64,
    payments: &[Payment],
    due_date: DateTime<Utc>,
    current_status: InvoiceStatus,
    now: DateTime<Utc>,
) -> Reconciliation {
    let total = to_decimal(total_amount);
    let paid = sum_payments(payments);
    let balance = total - paid;

    let status = if current_status.is_terminal() {
        current_status
    } else if balance <= Decimal::ZERO && total > Decimal::ZERO {
        InvoiceStatus::Paid
    } else if paid > Decimal::ZERO {
        InvoiceStatus::PartiallyPaid
    } else if now > due_date {
        InvoiceStatus::Overdue
    } else {
        current_status
    };

    Reconciliation {
        amount_paid: to_f64(paid),
        balance: to_f64(balance.max(Decimal::ZERO)),
        status,
    }
}
