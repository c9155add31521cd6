//! Sale and line-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sale lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Confirmed => "confirmed",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    /// Strict parse for caller-supplied status values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SaleStatus::Pending),
            "confirmed" => Some(SaleStatus::Confirmed),
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }
}

/// Sale record. Status is stored as text; [`SaleStatus`] guards the values
/// accepted at the edges.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub sale_id: Uuid,
    pub client_id: i64,
    pub sale_date: DateTime<Utc>,
    pub total: Decimal,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// One cart entry within a sale. Written once at creation, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleLineItem {
    pub line_item_id: Uuid,
    pub sale_id: Uuid,
    pub item_id: i64,
    pub product_name: String,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub position: i32,
}

/// Sale plus its line items, as returned by the REST surface.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub sale_id: Uuid,
    pub client_id: i64,
    pub sale_date: DateTime<Utc>,
    pub total: Decimal,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub line_items: Vec<LineItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub line_item_id: Uuid,
    pub item_id: i64,
    pub product_name: String,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl From<(Sale, Vec<SaleLineItem>)> for SaleResponse {
    fn from((sale, items): (Sale, Vec<SaleLineItem>)) -> Self {
        Self {
            sale_id: sale.sale_id,
            client_id: sale.client_id,
            sale_date: sale.sale_date,
            total: sale.total,
            status: sale.status,
            payment_method: sale.payment_method,
            notes: sale.notes,
            line_items: items.into_iter().map(LineItemResponse::from).collect(),
        }
    }
}

impl From<SaleLineItem> for LineItemResponse {
    fn from(item: SaleLineItem) -> Self {
        Self {
            line_item_id: item.line_item_id,
            item_id: item.item_id,
            product_name: item.product_name,
            size_label: item.size_label,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
        }
    }
}

/// Compact summary consumed by the delivery service's enrichment path.
#[derive(Debug, Serialize)]
pub struct SaleSummaryResponse {
    pub sale_id: Uuid,
    pub client_id: i64,
    pub total: Decimal,
    pub sale_date: DateTime<Utc>,
    pub status: String,
}

impl From<&Sale> for SaleSummaryResponse {
    fn from(sale: &Sale) -> Self {
        Self {
            sale_id: sale.sale_id,
            client_id: sale.client_id,
            total: sale.total,
            sale_date: sale.sale_date,
            status: sale.status.clone(),
        }
    }
}
