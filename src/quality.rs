//! Data quality reports over client records

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::model::{ClientSummary, PENDING_NAME};
use crate::rest::{CountOption, Filter, RpcFunction, Table};
use crate::AutoCheck;

/// Counts of complete and pending client records
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: u64,
    pub pending: u64,
    pub complete: u64,
    /// Share of complete records, in percent
    pub completion_rate: f64,
}

impl ClientStats {
    pub fn new(total: u64, pending: u64, complete: u64) -> Self {
        let completion_rate = if total > 0 {
            complete as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        ClientStats {
            total,
            pending,
            complete,
            completion_rate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CleanupRow {
    #[serde(default)]
    cleaned_count: Option<u64>,
}

/// Data quality queries
pub struct Quality<'a> {
    shop: &'a AutoCheck,
}

impl<'a> Quality<'a> {
    pub(crate) fn new(shop: &'a AutoCheck) -> Self {
        Self { shop }
    }

    /// Clients still missing contact details
    pub async fn incomplete_clients(&self) -> Result<Vec<ClientSummary>> {
        self.shop
            .rpc(RpcFunction::GetIncompleteClients, json!({}))
            .execute::<Option<Vec<ClientSummary>>>()
            .await
            .map(Option::unwrap_or_default)
    }

    /// Delete stale placeholder clients that never got a check-in.
    /// Returns how many were removed.
    pub async fn cleanup_pending_clients(&self) -> Result<u64> {
        let rows: Option<Vec<CleanupRow>> = self
            .shop
            .rpc(RpcFunction::CleanupPendingClients, json!({}))
            .execute()
            .await?;
        let cleaned = rows
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.cleaned_count)
            .unwrap_or(0);
        info!("Cleaned up {} pending clients", cleaned);
        Ok(cleaned)
    }

    /// Exact counts of all, pending and complete clients
    pub async fn client_stats(&self) -> Result<ClientStats> {
        let clients = self.shop.from(Table::Clients);

        let total = clients.select("id").count(CountOption::Exact).await?;

        let pending = clients
            .select("id")
            .or(&[
                Filter::eq("customer_name", PENDING_NAME),
                Filter::is_null("customer_name"),
                Filter::eq("customer_name", ""),
            ])
            .count(CountOption::Exact)
            .await?;

        let complete = clients
            .select("id")
            .neq("customer_name", PENDING_NAME)
            .not_null("customer_name")
            .neq("customer_name", "")
            .count(CountOption::Exact)
            .await?;

        Ok(ClientStats::new(total, pending, complete))
    }
}
