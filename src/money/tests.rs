//! Unit tests for the totals calculator and payment reconciler

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use super::reconcile::{reconcile, sum_payments};
use super::totals::recalculate_totals;
use crate::db::models::{InvoiceStatus, LineItem, Payment, PaymentMethod};

fn line(quantity: u32, unit_price: f64, discount: f64, tax: f64) -> LineItem {
    LineItem {
        product: None,
        description: "widget".to_string(),
        quantity,
        unit_price,
        discount,
        tax,
        total: 0.0,
    }
}

fn payment(amount: f64) -> Payment {
    Payment {
        amount,
        date: Utc::now(),
        method: PaymentMethod::BankTransfer,
        reference: None,
        recorded_by: None,
    }
}

#[test]
fn single_line_discount_and_tax() {
    // 2 x 100, 10% discount, 5% tax on the discounted amount
    let mut items = vec![line(2, 100.0, 10.0, 5.0)];
    let totals = recalculate_totals(&mut items);

    assert_eq!(totals.subtotal, 200.0);
    assert_eq!(totals.discount_total, 20.0);
    assert_eq!(totals.tax_total, 9.0);
    assert_eq!(totals.total, 189.0);
    assert_eq!(items[0].total, 189.0);
}

#[test]
fn multiple_lines_accumulate() {
    let mut items = vec![line(1, 50.0, 0.0, 0.0), line(3, 10.0, 50.0, 10.0)];
    let totals = recalculate_totals(&mut items);

    // Line 2: sub 30, disc 15, taxable 15, tax 1.50, total 16.50
    assert_eq!(totals.subtotal, 80.0);
    assert_eq!(totals.discount_total, 15.0);
    assert_eq!(totals.tax_total, 1.5);
    assert_eq!(totals.total, 66.5);
    assert_eq!(items[1].total, 16.5);
}

#[test]
fn client_supplied_line_totals_are_overwritten() {
    let mut item = line(1, 10.0, 0.0, 0.0);
    item.total = 9999.0;
    let totals = recalculate_totals(std::slice::from_mut(&mut item));

    assert_eq!(item.total, 10.0);
    assert_eq!(totals.total, 10.0);
}

#[test]
fn rounding_is_half_up_per_figure() {
    // 3 x 0.335 = 1.005 -> 1.01 after half-up rounding
    let mut items = vec![line(3, 0.335, 0.0, 0.0)];
    let totals = recalculate_totals(&mut items);
    assert_eq!(totals.total, 1.01);
}

#[test]
fn empty_document_is_all_zero() {
    let mut items: Vec<LineItem> = vec![];
    let totals = recalculate_totals(&mut items);
    assert_eq!(totals.subtotal, 0.0);
    assert_eq!(totals.total, 0.0);
}

#[test]
fn full_payment_marks_paid() {
    let due = Utc::now() + Duration::days(30);
    let r = reconcile(
        189.0,
        &[payment(100.0), payment(89.0)],
        due,
        InvoiceStatus::Sent,
        Utc::now(),
    );

    assert_eq!(r.amount_paid, 189.0);
    assert_eq!(r.balance, 0.0);
    assert_eq!(r.status, InvoiceStatus::Paid);
}

#[test]
fn partial_payment_marks_partially_paid() {
    let due = Utc::now() + Duration::days(30);
    let r = reconcile(200.0, &[payment(50.0)], due, InvoiceStatus::Sent, Utc::now());

    assert_eq!(r.amount_paid, 50.0);
    assert_eq!(r.balance, 150.0);
    assert_eq!(r.status, InvoiceStatus::PartiallyPaid);
}

#[test]
fn unpaid_past_due_becomes_overdue() {
    let due = Utc::now() - Duration::days(1);
    let r = reconcile(200.0, &[], due, InvoiceStatus::Sent, Utc::now());
    assert_eq!(r.status, InvoiceStatus::Overdue);
}

#[test]
fn unpaid_draft_past_due_becomes_overdue() {
    let due = Utc::now() - Duration::days(10);
    let r = reconcile(200.0, &[], due, InvoiceStatus::Draft, Utc::now());
    assert_eq!(r.status, InvoiceStatus::Overdue);
}

#[test]
fn cancelled_status_is_terminal() {
    let due = Utc::now() - Duration::days(10);
    let r = reconcile(
        200.0,
        &[payment(200.0)],
        due,
        InvoiceStatus::Cancelled,
        Utc::now(),
    );
    assert_eq!(r.status, InvoiceStatus::Cancelled);
}

#[test]
fn void_status_is_terminal() {
    let due = Utc::now() - Duration::days(10);
    let r = reconcile(
        200.0,
        &[payment(200.0)],
        due,
        InvoiceStatus::Void,
        Utc::now(),
    );
    assert_eq!(r.status, InvoiceStatus::Void);
}

#[test]
fn payment_sums_are_exact_decimals() {
    // 0.1 + 0.2 never sums to 0.3 in f64
    assert_eq!(sum_payments(&[payment(0.1), payment(0.2)]), dec!(0.3));
}

#[test]
fn float_cent_sums_are_exact() {
    // 0.1 + 0.2 in f64 is not 0.3; Decimal arithmetic must make it exact
    let due = Utc::now() + Duration::days(30);
    let r = reconcile(
        0.3,
        &[payment(0.1), payment(0.2)],
        due,
        InvoiceStatus::Sent,
        Utc::now(),
    );
    assert_eq!(r.balance, 0.0);
    assert_eq!(r.status, InvoiceStatus::Paid);
}
