//! Document total calculator for invoices, quotations and orders
//!
//! Per line: `subtotal = quantity * unit_price`, discount and tax are
//! percentages; discount applies to the subtotal, tax applies to the
//! discounted amount. Document totals are sums of the line figures with
//! `total = subtotal - discount + tax`.

use rust_decimal::Decimal;

use super::{to_decimal, to_f64};
use crate::db::models::LineItem;

/// Rolled-up document totals, rounded for storage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentTotals {
    pub subtotal: f64,
    pub discount_total: f64,
    pub tax_total: f64,
    pub total: f64,
}

struct LineAmounts {
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    total: Decimal,
}

fn line_amounts(item: &LineItem) -> LineAmounts {
    let subtotal = to_decimal(item.unit_price) * Decimal::from(item.quantity);
    let discount = subtotal * to_decimal(item.discount) / Decimal::ONE_HUNDRED;
    let taxable = subtotal - discount;
    let tax = taxable * to_decimal(item.tax) / Decimal::ONE_HUNDRED;

    LineAmounts {
        subtotal,
        discount,
        tax,
        total: taxable + tax,
    }
}

/// Recompute every line total plus the document rollup
///
/// Line `total` fields are overwritten; client-supplied totals are never
/// trusted.
pub fn recalculate_totals(items: &mut [LineItem]) -> DocumentTotals {
    let mut subtotal = Decimal::ZERO;
    let mut discount_total = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;

    for item in items.iter_mut() {
        let amounts = line_amounts(item);
        item.total = to_f64(amounts.total);

        subtotal += amounts.subtotal;
        discount_total += amounts.discount;
        tax_total += amounts.tax;
    }

    let total = subtotal - discount_total + tax_total;

    DocumentTotals {
        subtotal: to_f64(subtotal),
        discount_total: to_f64(discount_total),
        tax_total: to_f64(tax_total),
        total: to_f64(total.max(Decimal::ZERO)),
    }
}
