//! Sale handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::models::{SaleResponse, SaleStatus, SaleSummaryResponse};
use crate::services::orchestrator::{NewLineItem, NewSale};
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    #[validate(range(min = 1, message = "client_id must be positive"))]
    pub client_id: i64,
    #[validate(length(min = 1, max = 40, message = "payment_method must not be empty"))]
    pub payment_method: String,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LineItemRequest {
    pub item_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Create a sale and run its fulfillment.
#[tracing::instrument(skip(state, request))]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    request.validate()?;

    let new_sale = NewSale {
        client_id: request.client_id,
        payment_method: request.payment_method,
        notes: request.notes,
        line_items: request
            .line_items
            .into_iter()
            .map(|item| NewLineItem {
                item_id: item.item_id,
                product_name: item.product_name,
                size_label: item.size_label,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
    };

    let (sale, line_items) = state.orchestrator.create_sale(new_sale).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaleResponse::from((sale, line_items))),
    ))
}

/// Fetch a sale with its line items.
#[tracing::instrument(skip(state))]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<Json<SaleResponse>, AppError> {
    let sale = state
        .store
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)))?;
    let line_items = state.store.find_line_items(sale_id).await?;

    Ok(Json(SaleResponse::from((sale, line_items))))
}

/// Fetch the compact summary served to collaborating services.
#[tracing::instrument(skip(state))]
pub async fn get_sale_summary(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<Json<SaleSummaryResponse>, AppError> {
    let sale = state
        .store
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)))?;

    Ok(Json(SaleSummaryResponse::from(&sale)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSaleStatusRequest {
    pub status: String,
}

/// Change a sale's status. Only the known status values are accepted.
#[tracing::instrument(skip(state, request))]
pub async fn update_sale_status(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(request): Json<UpdateSaleStatusRequest>,
) -> Result<Json<SaleResponse>, AppError> {
    let status = SaleStatus::parse(&request.status).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Unknown sale status: {}", request.status))
    })?;

    let updated = state.store.update_status(sale_id, status.as_str()).await?;
    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Sale {} not found",
            sale_id
        )));
    }

    let sale = state
        .store
        .find_sale(sale_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)))?;
    let line_items = state.store.find_line_items(sale_id).await?;

    tracing::info!(sale_id = %sale_id, status = %sale.status, "Sale status updated");
    Ok(Json(SaleResponse::from((sale, line_items))))
}
