//! Sale-fulfillment orchestration.
//!
//! Coordinates the local sale write with the inventory collaborator's stock
//! decrements and the best-effort delivery request. A stock adjustment
//! failure aborts the whole operation: already-applied adjustments are
//! compensated in reverse order and the local write is rolled back, so a
//! sale is never observable unless every decrement succeeded.

use crate::models::{Sale, SaleLineItem, SaleStatus};
use crate::services::delivery::{DeliveryProvider, DeliveryRequest};
use crate::services::inventory::{InventoryError, InventoryProvider, StockAdjustment};
use crate::services::metrics::{
    record_sale_created, record_side_effect, record_stock_adjustment, record_stock_compensation,
};
use crate::services::store::SaleStore;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub const ADJUST_REASON_SALE: &str = "sale";
pub const ADJUST_REASON_REVERSAL: &str = "sale_reversal";

/// Input for one sale creation attempt.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub client_id: i64,
    pub payment_method: String,
    pub notes: Option<String>,
    pub line_items: Vec<NewLineItem>,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub item_id: i64,
    pub product_name: String,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Error)]
pub enum CreateSaleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("stock adjustment for item {item_id} failed: {source}")]
    Fulfillment {
        item_id: i64,
        #[source]
        source: InventoryError,
    },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<CreateSaleError> for AppError {
    fn from(err: CreateSaleError) -> Self {
        match err {
            CreateSaleError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            CreateSaleError::Fulfillment { item_id, source } => AppError::BadGateway(format!(
                "stock adjustment for item {} failed: {}",
                item_id, source
            )),
            CreateSaleError::Store(e) => e,
        }
    }
}

/// Coordinates sale creation across the local store and the collaborators.
pub struct SaleOrchestrator {
    store: Arc<dyn SaleStore>,
    inventory: Arc<dyn InventoryProvider>,
    delivery: Arc<dyn DeliveryProvider>,
}

impl SaleOrchestrator {
    pub fn new(
        store: Arc<dyn SaleStore>,
        inventory: Arc<dyn InventoryProvider>,
        delivery: Arc<dyn DeliveryProvider>,
    ) -> Self {
        Self {
            store,
            inventory,
            delivery,
        }
    }

    /// Create a sale: validate, persist, decrement stock per line item in
    /// cart order, then request the delivery record best-effort.
    #[tracing::instrument(skip(self, new_sale), fields(client_id = new_sale.client_id, line_items = new_sale.line_items.len()))]
    pub async fn create_sale(
        &self,
        new_sale: NewSale,
    ) -> Result<(Sale, Vec<SaleLineItem>), CreateSaleError> {
        validate(&new_sale)?;

        let now = Utc::now();
        let sale_id = Uuid::new_v4();

        let line_items: Vec<SaleLineItem> = new_sale
            .line_items
            .iter()
            .enumerate()
            .map(|(position, item)| SaleLineItem {
                line_item_id: Uuid::new_v4(),
                sale_id,
                item_id: item.item_id,
                product_name: item.product_name.clone(),
                size_label: item.size_label.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: Decimal::from(item.quantity) * item.unit_price,
                position: position as i32,
            })
            .collect();

        let total: Decimal = line_items.iter().map(|item| item.subtotal).sum();

        let sale = Sale {
            sale_id,
            client_id: new_sale.client_id,
            sale_date: now,
            total,
            status: SaleStatus::Pending.as_str().to_string(),
            payment_method: new_sale.payment_method,
            notes: new_sale.notes,
            created_utc: now,
        };

        self.store.insert_sale(&sale, &line_items).await?;
        tracing::info!(sale_id = %sale_id, total = %total, "Sale persisted, starting fulfillment");

        if let Err(err) = self.adjust_stock_for(&sale, &line_items).await {
            record_sale_created("fulfillment_failed");
            return Err(err);
        }

        record_sale_created("ok");
        self.request_delivery(sale_id);

        Ok((sale, line_items))
    }

    /// Decrement stock for each line item sequentially, in cart order. On
    /// failure, compensate the already-applied decrements in reverse order
    /// and roll back the local write.
    async fn adjust_stock_for(
        &self,
        sale: &Sale,
        line_items: &[SaleLineItem],
    ) -> Result<(), CreateSaleError> {
        for (index, item) in line_items.iter().enumerate() {
            let adjustment = StockAdjustment {
                item_id: item.item_id,
                delta: -item.quantity,
                reason: ADJUST_REASON_SALE.to_string(),
                actor_id: sale.client_id,
            };

            match self.inventory.adjust_stock(&adjustment).await {
                Ok(()) => {
                    record_stock_adjustment("ok");
                    tracing::debug!(
                        item_id = item.item_id,
                        delta = adjustment.delta,
                        "Stock adjusted"
                    );
                }
                Err(source) => {
                    record_stock_adjustment("failed");
                    tracing::warn!(
                        sale_id = %sale.sale_id,
                        item_id = item.item_id,
                        error = %source,
                        "Stock adjustment failed, aborting sale"
                    );

                    self.compensate(sale, &line_items[..index]).await;
                    self.roll_back(sale.sale_id).await;

                    return Err(CreateSaleError::Fulfillment {
                        item_id: item.item_id,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Re-increment stock for the adjustments already applied, most recent
    /// first. Failures here are logged and counted, never propagated: the
    /// fulfillment failure that triggered the compensation is the error the
    /// caller must see.
    async fn compensate(&self, sale: &Sale, applied: &[SaleLineItem]) {
        for item in applied.iter().rev() {
            let reversal = StockAdjustment {
                item_id: item.item_id,
                delta: item.quantity,
                reason: ADJUST_REASON_REVERSAL.to_string(),
                actor_id: sale.client_id,
            };

            match self.inventory.adjust_stock(&reversal).await {
                Ok(()) => {
                    record_stock_compensation("ok");
                    tracing::info!(
                        sale_id = %sale.sale_id,
                        item_id = item.item_id,
                        delta = reversal.delta,
                        "Stock decrement compensated"
                    );
                }
                Err(e) => {
                    record_stock_compensation("failed");
                    tracing::error!(
                        sale_id = %sale.sale_id,
                        item_id = item.item_id,
                        error = %e,
                        "Compensation failed, stock left decremented"
                    );
                }
            }
        }
    }

    async fn roll_back(&self, sale_id: Uuid) {
        match self.store.delete_sale(sale_id).await {
            Ok(_) => tracing::info!(sale_id = %sale_id, "Local sale write rolled back"),
            Err(e) => tracing::error!(
                sale_id = %sale_id,
                error = %e,
                "Rollback failed, orphaned sale row left behind"
            ),
        }
    }

    /// Fire-and-forget delivery request. The outcome is reported through
    /// logs and the side-effect metric, never through the sale result.
    fn request_delivery(&self, sale_id: Uuid) {
        let delivery = self.delivery.clone();
        tokio::spawn(async move {
            let request = DeliveryRequest {
                sale_id,
                initial_status: "pending".to_string(),
            };

            match delivery.create_delivery(&request).await {
                Ok(()) => {
                    record_side_effect("delivery_request", "ok");
                    tracing::info!(sale_id = %sale_id, "Delivery requested");
                }
                Err(e) => {
                    record_side_effect("delivery_request", "failed");
                    tracing::warn!(
                        sale_id = %sale_id,
                        error = %e,
                        "Delivery request failed, sale unaffected"
                    );
                }
            }
        });
    }
}

fn validate(new_sale: &NewSale) -> Result<(), CreateSaleError> {
    if new_sale.client_id < 1 {
        return Err(CreateSaleError::Validation(
            "client_id must be positive".to_string(),
        ));
    }
    if new_sale.payment_method.trim().is_empty() {
        return Err(CreateSaleError::Validation(
            "payment_method must not be empty".to_string(),
        ));
    }
    if new_sale.line_items.is_empty() {
        return Err(CreateSaleError::Validation(
            "at least one line item is required".to_string(),
        ));
    }

    for (index, item) in new_sale.line_items.iter().enumerate() {
        if item.item_id < 1 {
            return Err(CreateSaleError::Validation(format!(
                "line item {}: item_id must be positive",
                index
            )));
        }
        if item.product_name.trim().is_empty() {
            return Err(CreateSaleError::Validation(format!(
                "line item {}: product_name must not be empty",
                index
            )));
        }
        if item.quantity < 1 {
            return Err(CreateSaleError::Validation(format!(
                "line item {}: quantity must be positive",
                index
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(CreateSaleError::Validation(format!(
                "line item {}: unit_price must not be negative",
                index
            )));
        }
    }

    Ok(())
}
