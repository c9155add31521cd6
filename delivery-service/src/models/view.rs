//! Enriched delivery view with tagged externally-sourced fields.

use crate::models::delivery::Delivery;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one externally-sourced lookup.
///
/// The tag, not a placeholder string, is what distinguishes a record that
/// does not exist from a collaborator that could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    Resolved(T),
    NotFound,
    Unavailable,
}

impl<T> Sourced<T> {
    pub fn tag(&self) -> &'static str {
        match self {
            Sourced::Resolved(_) => "resolved",
            Sourced::NotFound => "not_found",
            Sourced::Unavailable => "unavailable",
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Sourced::Resolved(value) => Some(value),
            _ => None,
        }
    }
}

/// Sale summary as served by the sales collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaleSummary {
    pub sale_id: Uuid,
    /// Absent when the sale carries no client reference.
    pub client_id: Option<i64>,
    pub total: Decimal,
    pub sale_date: DateTime<Utc>,
    pub status: String,
}

/// Client summary as served by the users collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSummary {
    pub client_id: i64,
    pub display_name: String,
    pub phone: Option<String>,
}

/// The merged view: local delivery fields plus whatever could be resolved.
///
/// `client` is `None` when the lookup was never attempted, either because
/// the sale itself did not resolve or because it carries no client
/// reference.
#[derive(Debug)]
pub struct DeliveryView {
    pub delivery: Delivery,
    pub sale: Sourced<SaleSummary>,
    pub client: Option<Sourced<ClientSummary>>,
}

/// Display-ready rendering of a [`DeliveryView`]. Degraded lookups surface
/// as placeholder text plus a machine-readable resolution tag per source.
#[derive(Debug, Serialize)]
pub struct DeliveryViewResponse {
    pub delivery_id: Uuid,
    pub sale_id: Uuid,
    pub status: String,
    pub carrier_id: Option<i64>,
    pub assigned_utc: Option<DateTime<Utc>>,
    pub completed_utc: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub area_id: Option<i64>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub client_name: String,
    pub client_phone: String,
    pub sale_resolution: String,
    pub client_resolution: String,
}

impl From<DeliveryView> for DeliveryViewResponse {
    fn from(view: DeliveryView) -> Self {
        let sale_resolution = view.sale.tag().to_string();
        let client_resolution = view
            .client
            .as_ref()
            .map(|c| c.tag().to_string())
            .unwrap_or_else(|| "skipped".to_string());

        let total = view
            .sale
            .resolved()
            .map(|s| s.total)
            .unwrap_or(Decimal::ZERO);

        let (client_name, client_phone) = match (&view.sale, &view.client) {
            (Sourced::NotFound, _) => ("sale not found".to_string(), "-".to_string()),
            (Sourced::Unavailable, _) => {
                ("sales service unavailable".to_string(), "-".to_string())
            }
            (Sourced::Resolved(_), Some(Sourced::Resolved(client))) => (
                client.display_name.clone(),
                client.phone.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (Sourced::Resolved(sale), Some(Sourced::NotFound)) => (
                format!("client {} not found", sale.client_id.unwrap_or_default()),
                "-".to_string(),
            ),
            (Sourced::Resolved(_), Some(Sourced::Unavailable)) => {
                ("client service unavailable".to_string(), "-".to_string())
            }
            (Sourced::Resolved(_), None) => ("no client on record".to_string(), "-".to_string()),
        };

        Self {
            delivery_id: view.delivery.delivery_id,
            sale_id: view.delivery.sale_id,
            status: view.delivery.status,
            carrier_id: view.delivery.carrier_id,
            assigned_utc: view.delivery.assigned_utc,
            completed_utc: view.delivery.completed_utc,
            address: view.delivery.address,
            area_id: view.delivery.area_id,
            notes: view.delivery.notes,
            total,
            client_name,
            client_phone,
            sale_resolution,
            client_resolution,
        }
    }
}
