//! Sales dashboard handler
//!
//! One aggregate payload for the overview screen. The underlying rollups
//! are independent queries, so they run concurrently.

use std::collections::HashMap;

use axum::{Json, extract::State};
use chrono::{Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::common::AppResult;
use crate::core::ServerState;
use crate::db::models::{OpportunityStage, SalesOrderStatus};
use crate::db::repository::sales_order::MonthlyRevenue;
use crate::db::repository::{InvoiceRepository, OpportunityRepository, SalesOrderRepository};

#[derive(Debug, Serialize)]
pub struct TopProduct {
    pub product: Option<String>,
    pub description: String,
    pub quantity: u64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct SalesDashboard {
    pub ytd_revenue: f64,
    pub ytd_orders: u64,
    pub average_order_value: f64,
    pub pending_orders: u64,
    pub active_opportunities: u64,
    pub active_opportunity_value: f64,
    /// Won deals as a share of all closed deals, in [0, 1]
    pub conversion_rate: f64,
    pub outstanding_invoices: u64,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_products: Vec<TopProduct>,
}

/// GET /api/sales/dashboard
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<SalesDashboard>> {
    let orders = SalesOrderRepository::new(state.db.clone());
    let opportunities = OpportunityRepository::new(state.db.clone());
    let invoices = InvoiceRepository::new(state.db.clone());

    let year_start = Utc
        .with_ymd_and_hms(Utc::now().year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let (ytd, pending, stage_stats, outstanding, monthly, completed_items) = tokio::join!(
        orders.revenue_since(year_start),
        orders.count_by_status(SalesOrderStatus::Pending),
        opportunities.stats_by_stage(),
        invoices.count_outstanding(),
        orders.revenue_by_month(year_start),
        orders.completed_order_items(),
    );
    let ytd = ytd?;
    let pending = pending?;
    let stage_stats = stage_stats?;
    let outstanding = outstanding?;
    let monthly = monthly?;
    let completed_items = completed_items?;

    let average_order_value = if ytd.orders > 0 {
        ytd.revenue / ytd.orders as f64
    } else {
        0.0
    };

    let mut active = 0u64;
    let mut active_value = 0.0;
    let mut won = 0u64;
    let mut closed = 0u64;
    for stats in &stage_stats {
        match stats.stage {
            OpportunityStage::ClosedWon => {
                won += stats.count;
                closed += stats.count;
            }
            OpportunityStage::ClosedLost => closed += stats.count,
            _ => {
                active += stats.count;
                active_value += stats.total_value;
            }
        }
    }
    let conversion_rate = if closed > 0 {
        won as f64 / closed as f64
    } else {
        0.0
    };

    Ok(Json(SalesDashboard {
        ytd_revenue: ytd.revenue,
        ytd_orders: ytd.orders,
        average_order_value,
        pending_orders: pending,
        active_opportunities: active,
        active_opportunity_value: active_value,
        conversion_rate,
        outstanding_invoices: outstanding,
        revenue_by_month: monthly,
        top_products: top_products(completed_items.iter().flatten(), 5),
    }))
}

/// Rank products across completed order lines by quantity sold
fn top_products<'a>(
    items: impl Iterator<Item = &'a crate::db::models::LineItem>,
    limit: usize,
) -> Vec<TopProduct> {
    let mut by_product: HashMap<String, TopProduct> = HashMap::new();
    for item in items {
        let product = item.product.as_ref().map(|id| id.to_string());
        let key = product
            .clone()
            .unwrap_or_else(|| item.description.clone());
        let entry = by_product.entry(key).or_insert_with(|| TopProduct {
            product,
            description: item.description.clone(),
            quantity: 0,
            revenue: 0.0,
        });
        entry.quantity += u64::from(item.quantity);
        entry.revenue += item.total;
    }

    let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranked.truncate(limit);
    ranked
}
