//! Delivery enrichment: merging the local record with collaborator reads.
//!
//! `to_view` never fails. Each lookup degrades independently into a tag the
//! caller can render, and a users failure never discards what the sales
//! lookup already returned.

use crate::models::{ClientSummary, Delivery, DeliveryView, Sourced};
use crate::services::directory::{ClientProvider, SalesProvider};
use crate::services::metrics::record_enrichment_lookup;
use std::sync::Arc;

pub struct DeliveryEnricher {
    sales: Arc<dyn SalesProvider>,
    clients: Arc<dyn ClientProvider>,
}

impl DeliveryEnricher {
    pub fn new(sales: Arc<dyn SalesProvider>, clients: Arc<dyn ClientProvider>) -> Self {
        Self { sales, clients }
    }

    /// Build the display view for a delivery. The users lookup is gated on
    /// the sales lookup since it needs the client reference from the sale.
    #[tracing::instrument(skip(self, delivery), fields(delivery_id = %delivery.delivery_id, sale_id = %delivery.sale_id))]
    pub async fn to_view(&self, delivery: Delivery) -> DeliveryView {
        let sale = match self.sales.sale_summary(delivery.sale_id).await {
            Ok(Some(summary)) => {
                record_enrichment_lookup("sales", "resolved");
                Sourced::Resolved(summary)
            }
            Ok(None) => {
                record_enrichment_lookup("sales", "not_found");
                tracing::warn!(
                    delivery_id = %delivery.delivery_id,
                    sale_id = %delivery.sale_id,
                    "Delivery references a sale that no longer exists"
                );
                Sourced::NotFound
            }
            Err(e) => {
                record_enrichment_lookup("sales", "unavailable");
                tracing::warn!(
                    delivery_id = %delivery.delivery_id,
                    sale_id = %delivery.sale_id,
                    error = %e,
                    "Sales collaborator unavailable, degrading view"
                );
                Sourced::Unavailable
            }
        };

        let client = match &sale {
            Sourced::Resolved(summary) => match summary.client_id {
                Some(client_id) => Some(self.lookup_client(client_id).await),
                None => None,
            },
            _ => None,
        };

        DeliveryView {
            delivery,
            sale,
            client,
        }
    }

    async fn lookup_client(&self, client_id: i64) -> Sourced<ClientSummary> {
        match self.clients.client_summary(client_id).await {
            Ok(Some(summary)) => {
                record_enrichment_lookup("users", "resolved");
                Sourced::Resolved(summary)
            }
            Ok(None) => {
                record_enrichment_lookup("users", "not_found");
                tracing::warn!(client_id = client_id, "Client referenced by sale not found");
                Sourced::NotFound
            }
            Err(e) => {
                record_enrichment_lookup("users", "unavailable");
                tracing::warn!(
                    client_id = client_id,
                    error = %e,
                    "Users collaborator unavailable, degrading view"
                );
                Sourced::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SaleSummary;
    use crate::services::directory::{MockClientProvider, MockSalesProvider};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn delivery(sale_id: Uuid) -> Delivery {
        Delivery {
            delivery_id: Uuid::new_v4(),
            sale_id,
            carrier_id: None,
            status: "pending".to_string(),
            assigned_utc: None,
            completed_utc: None,
            address: Some("Av. Italia 1439".to_string()),
            area_id: Some(5),
            notes: None,
            created_utc: Utc::now(),
        }
    }

    fn summary(sale_id: Uuid, client_id: Option<i64>) -> SaleSummary {
        SaleSummary {
            sale_id,
            client_id,
            total: Decimal::from(139990),
            sale_date: Utc::now(),
            status: "pending".to_string(),
        }
    }

    fn client(client_id: i64) -> ClientSummary {
        ClientSummary {
            client_id,
            display_name: "Ana Rojas".to_string(),
            phone: Some("+56911112222".to_string()),
        }
    }

    struct Harness {
        sales: Arc<MockSalesProvider>,
        clients: Arc<MockClientProvider>,
        enricher: DeliveryEnricher,
    }

    fn harness() -> Harness {
        let sales = Arc::new(MockSalesProvider::new());
        let clients = Arc::new(MockClientProvider::new());
        let enricher = DeliveryEnricher::new(sales.clone(), clients.clone());
        Harness {
            sales,
            clients,
            enricher,
        }
    }

    #[tokio::test]
    async fn resolves_sale_and_client() {
        let h = harness();
        let sale_id = Uuid::new_v4();
        h.sales.insert(summary(sale_id, Some(100))).await;
        h.clients.insert(client(100)).await;

        let view = h.enricher.to_view(delivery(sale_id)).await;

        assert_eq!(view.sale.tag(), "resolved");
        assert_eq!(
            view.client.as_ref().map(|c| c.tag()),
            Some("resolved")
        );
        let resolved = view.client.unwrap();
        assert_eq!(
            resolved.resolved().map(|c| c.display_name.as_str()),
            Some("Ana Rojas")
        );
    }

    #[tokio::test]
    async fn missing_sale_skips_the_client_lookup() {
        let h = harness();
        // any client data would be wrong to fetch here
        h.clients.insert(client(100)).await;

        let view = h.enricher.to_view(delivery(Uuid::new_v4())).await;

        assert_eq!(view.sale, Sourced::NotFound);
        assert!(view.client.is_none());
    }

    #[tokio::test]
    async fn unavailable_sales_collaborator_degrades_not_fails() {
        let h = harness();
        h.sales.set_unavailable(true);

        let view = h.enricher.to_view(delivery(Uuid::new_v4())).await;

        assert_eq!(view.sale, Sourced::Unavailable);
        assert!(view.client.is_none());
    }

    #[tokio::test]
    async fn client_failure_is_isolated_from_the_sale() {
        let h = harness();
        let sale_id = Uuid::new_v4();
        h.sales.insert(summary(sale_id, Some(100))).await;
        h.clients.set_unavailable(true);

        let view = h.enricher.to_view(delivery(sale_id)).await;

        assert!(view.sale.resolved().is_some());
        assert_eq!(view.client, Some(Sourced::Unavailable));
    }

    #[tokio::test]
    async fn missing_client_is_tagged_not_found() {
        let h = harness();
        let sale_id = Uuid::new_v4();
        h.sales.insert(summary(sale_id, Some(42))).await;

        let view = h.enricher.to_view(delivery(sale_id)).await;

        assert_eq!(view.client, Some(Sourced::NotFound));
    }

    #[tokio::test]
    async fn sale_without_client_reference_never_queries_users() {
        let h = harness();
        let sale_id = Uuid::new_v4();
        h.sales.insert(summary(sale_id, None)).await;
        // even an unavailable users collaborator must not matter
        h.clients.set_unavailable(true);

        let view = h.enricher.to_view(delivery(sale_id)).await;

        assert!(view.sale.resolved().is_some());
        assert!(view.client.is_none());
    }
}
