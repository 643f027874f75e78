//! Invoice API handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{
    Invoice, InvoiceCreate, InvoiceStatus, InvoiceUpdate, Payment, PaymentRequest,
};
use crate::db::repository::invoice::{
    InvoiceFilter, InvoiceStatusCount, InvoiceTotals, PaymentApplication,
};
use crate::db::repository::{InvoiceRepository, SequenceRepository, record_key};
use crate::money::reconcile::reconcile;
use crate::money::totals::recalculate_totals;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<InvoiceStatus>,
    pub customer: Option<String>,
}

/// GET /api/sales/invoices
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Invoice>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = InvoiceFilter {
        status: query.status,
        customer: query.customer,
    };
    let repo = InvoiceRepository::new(state.db.clone());
    let (invoices, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(invoices, total, params)))
}

/// GET /api/sales/invoices/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Invoice>> {
    let repo = InvoiceRepository::new(state.db.clone());
    let invoice = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;
    Ok(Json(invoice))
}

/// POST /api/sales/invoices
///
/// Totals are always recomputed server-side; the invoice number comes from
/// the per-month atomic counter.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<Invoice>> {
    payload.validate()?;

    let sequences = SequenceRepository::new(state.db.clone());
    let invoice_number = sequences.next_invoice_number().await?;

    let mut items = payload.items;
    let totals = recalculate_totals(&mut items);

    let now = Utc::now();
    let invoice = Invoice {
        id: None,
        invoice_number,
        customer: payload
            .customer
            .map(|id| RecordId::from_table_key("customer", record_key("customer", &id))),
        sales_order: payload
            .sales_order
            .map(|id| RecordId::from_table_key("sales_order", record_key("sales_order", &id))),
        status: payload.status,
        items,
        subtotal: totals.subtotal,
        discount_total: totals.discount_total,
        tax_total: totals.tax_total,
        total_amount: totals.total,
        amount_paid: 0.0,
        balance: totals.total,
        payments: Vec::new(),
        issue_date: payload.issue_date.unwrap_or(now),
        due_date: payload.due_date,
        notes: payload.notes,
        version: 1,
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
        updated_at: now,
    };

    let repo = InvoiceRepository::new(state.db.clone());
    let created = repo.create(invoice).await?;
    Ok(Json(created))
}

/// PUT /api/sales/invoices/{id}
///
/// Item edits replace the list and recompute totals, then money fields are
/// reconciled against the already-recorded payments.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<Json<Invoice>> {
    payload.validate()?;

    let repo = InvoiceRepository::new(state.db.clone());
    let mut invoice = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;

    if invoice.status.is_terminal() {
        return Err(AppError::business_rule(
            "Cancelled or void invoices cannot be edited",
        ));
    }

    if let Some(status) = payload.status {
        invoice.status = status;
    }
    if let Some(due_date) = payload.due_date {
        invoice.due_date = due_date;
    }
    if let Some(notes) = payload.notes {
        invoice.notes = Some(notes);
    }
    if let Some(mut items) = payload.items {
        let totals = recalculate_totals(&mut items);
        invoice.items = items;
        invoice.subtotal = totals.subtotal;
        invoice.discount_total = totals.discount_total;
        invoice.tax_total = totals.tax_total;
        invoice.total_amount = totals.total;
    }

    let now = Utc::now();
    let recon = reconcile(
        invoice.total_amount,
        &invoice.payments,
        invoice.due_date,
        invoice.status,
        now,
    );
    invoice.amount_paid = recon.amount_paid;
    invoice.balance = recon.balance;
    invoice.status = recon.status;
    invoice.updated_at = now;

    let updated = repo
        .replace(&id, invoice)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;
    Ok(Json(updated))
}

/// DELETE /api/sales/invoices/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = InvoiceRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;
    Ok(Json(true))
}

/// POST /api/sales/invoices/{id}/payments
///
/// Appends a payment and reconciles money fields under the version guard;
/// a concurrent writer makes the guard miss and the request fails with 409
/// so the client can re-read and retry.
pub async fn record_payment(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<Invoice>> {
    payload.validate()?;

    let repo = InvoiceRepository::new(state.db.clone());
    let invoice = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;

    if invoice.status.is_terminal() {
        return Err(AppError::business_rule(
            "Payments cannot be recorded on a cancelled or void invoice",
        ));
    }
    if payload.amount > invoice.balance {
        return Err(AppError::business_rule(format!(
            "Payment of {} exceeds the outstanding balance of {}",
            payload.amount, invoice.balance
        )));
    }

    let now = Utc::now();
    let mut payments = invoice.payments.clone();
    payments.push(Payment {
        amount: payload.amount,
        date: payload.date.unwrap_or(now),
        method: payload.method,
        reference: payload.reference,
        recorded_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
    });

    let recon = reconcile(
        invoice.total_amount,
        &payments,
        invoice.due_date,
        invoice.status,
        now,
    );

    let application = PaymentApplication {
        payments,
        amount_paid: recon.amount_paid,
        balance: recon.balance,
        status: recon.status,
        expected_version: invoice.version,
    };

    let updated = repo
        .apply_payment(&id, application)
        .await?
        .ok_or_else(|| AppError::conflict("Invoice was modified concurrently, retry"))?;
    Ok(Json(updated))
}

/// Invoice statistics: overall, per-status (zero-filled) and last 30 days
#[derive(Debug, Serialize)]
pub struct InvoiceStatistics {
    pub overall: InvoiceTotals,
    pub by_status: Vec<InvoiceStatusCount>,
    pub recent: InvoiceTotals,
}

const ALL_STATUSES: [InvoiceStatus; 7] = [
    InvoiceStatus::Draft,
    InvoiceStatus::Sent,
    InvoiceStatus::PartiallyPaid,
    InvoiceStatus::Paid,
    InvoiceStatus::Overdue,
    InvoiceStatus::Cancelled,
    InvoiceStatus::Void,
];

/// GET /api/sales/invoices/statistics
pub async fn statistics(State(state): State<ServerState>) -> AppResult<Json<InvoiceStatistics>> {
    let repo = InvoiceRepository::new(state.db.clone());
    let since = Utc::now() - Duration::days(30);
    let (overall, rows, recent) = repo.statistics(since).await?;

    let mut by_status: Vec<InvoiceStatusCount> = ALL_STATUSES
        .iter()
        .map(|status| InvoiceStatusCount {
            status: *status,
            count: 0,
            amount: 0.0,
        })
        .collect();
    for row in rows {
        if let Some(bucket) = by_status.iter_mut().find(|b| b.status == row.status) {
            bucket.count = row.count;
            bucket.amount = row.amount;
        }
    }

    Ok(Json(InvoiceStatistics {
        overall,
        by_status,
        recent,
    }))
}
