//! Table and RPC access through the REST API

mod filter;
mod query;
mod types;

use reqwest::Client;
use serde::Serialize;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for one table of the shop schema
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    target: Target,
    table: Table,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub(crate) fn new(
        url: &str,
        key: &str,
        token: Option<String>,
        schema: &str,
        table: Table,
        client: Client,
    ) -> Self {
        Self {
            target: Target {
                url: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table.as_str()),
                key: key.to_string(),
                token,
                schema: schema.to_string(),
                client,
            },
            table,
        }
    }

    /// The table this client reads and writes
    pub fn table(&self) -> Table {
        self.table
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.target.clone(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.target.clone(), values)
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.target.clone(), values)
    }

    /// Upsert data in the table (insert or update if it exists)
    pub fn upsert<T: Serialize>(&self, values: T) -> UpsertBuilder<T> {
        UpsertBuilder::new(self.target.clone(), values)
    }
}

/// Build an RPC call against `/rest/v1/rpc/{function}`
pub(crate) fn rpc<T: Serialize>(
    url: &str,
    key: &str,
    token: Option<String>,
    schema: &str,
    function: RpcFunction,
    params: T,
    client: Client,
) -> RpcBuilder<T> {
    let target = Target {
        url: format!("{}/rest/v1/rpc/{}", url.trim_end_matches('/'), function.as_str()),
        key: key.to_string(),
        token,
        schema: schema.to_string(),
        client,
    };
    RpcBuilder::new(target, params)
}
