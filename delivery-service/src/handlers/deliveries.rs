//! Delivery handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Delivery, DeliveryStatus, DeliveryViewResponse};
use crate::services::metrics::record_delivery_operation;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeliveryRequest {
    pub sale_id: Uuid,
    /// Defaults to `pending`.
    pub initial_status: Option<String>,
    #[validate(length(max = 500, message = "address too long"))]
    pub address: Option<String>,
    pub area_id: Option<i64>,
    #[validate(length(max = 1000, message = "notes too long"))]
    pub notes: Option<String>,
}

/// Create the delivery record tracking a sale.
#[tracing::instrument(skip(state, request))]
pub async fn create_delivery(
    State(state): State<AppState>,
    Json(request): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    request.validate()?;

    let status = match &request.initial_status {
        Some(value) => DeliveryStatus::parse(value).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Unknown delivery status: {}", value))
        })?,
        None => DeliveryStatus::Pending,
    };

    let delivery = Delivery {
        delivery_id: Uuid::new_v4(),
        sale_id: request.sale_id,
        carrier_id: None,
        status: status.as_str().to_string(),
        assigned_utc: None,
        completed_utc: None,
        address: request.address,
        area_id: request.area_id,
        notes: request.notes,
        created_utc: Utc::now(),
    };

    state.store.insert_delivery(&delivery).await?;
    record_delivery_operation("create", "ok");
    tracing::info!(
        delivery_id = %delivery.delivery_id,
        sale_id = %delivery.sale_id,
        "Delivery created"
    );

    Ok((StatusCode::CREATED, Json(delivery)))
}

/// Fetch the raw delivery record, local fields only.
#[tracing::instrument(skip(state))]
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = state
        .store
        .find_delivery(delivery_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Delivery {} not found", delivery_id)))?;

    Ok(Json(delivery))
}

/// Fetch the enriched view: local fields merged with the sale summary and
/// client details, each degrading independently.
#[tracing::instrument(skip(state))]
pub async fn get_delivery_view(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<DeliveryViewResponse>, AppError> {
    let delivery = state
        .store
        .find_delivery(delivery_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Delivery {} not found", delivery_id)))?;

    let view = state.enricher.to_view(delivery).await;
    Ok(Json(DeliveryViewResponse::from(view)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryStatusRequest {
    pub status: String,
    pub carrier_id: Option<i64>,
}

/// Change a delivery's status, stamping the assignment and completion
/// times as the delivery moves through them.
#[tracing::instrument(skip(state, request))]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryStatusRequest>,
) -> Result<Json<Delivery>, AppError> {
    let status = DeliveryStatus::parse(&request.status).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Unknown delivery status: {}",
            request.status
        ))
    })?;

    let mut delivery = state
        .store
        .find_delivery(delivery_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Delivery {} not found", delivery_id)))?;

    delivery.status = status.as_str().to_string();
    if let Some(carrier_id) = request.carrier_id {
        delivery.carrier_id = Some(carrier_id);
    }
    match status {
        DeliveryStatus::Assigned => delivery.assigned_utc = Some(Utc::now()),
        DeliveryStatus::Delivered => delivery.completed_utc = Some(Utc::now()),
        _ => {}
    }

    let updated = state.store.update_delivery(&delivery).await?;
    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Delivery {} not found",
            delivery_id
        )));
    }

    record_delivery_operation("status_change", "ok");
    tracing::info!(
        delivery_id = %delivery_id,
        status = %delivery.status,
        "Delivery status updated"
    );
    Ok(Json(delivery))
}
