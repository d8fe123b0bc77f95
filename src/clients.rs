//! Client records: numbering, contact details and portal credentials

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::model::{Client, ClientRow, ContactInfo, ContactPatch, NewClient};
use crate::rest::{RpcFunction, Table};
use crate::AutoCheck;

/// Result of the credentials procedure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsResponse {
    pub success: bool,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A client just written, with the portal password if one was issued
#[derive(Debug, Clone)]
pub struct SavedClient {
    pub client: Client,
    pub password: Option<String>,
}

/// Operations on the `clients` table
pub struct Clients<'a> {
    shop: &'a AutoCheck,
}

impl<'a> Clients<'a> {
    pub(crate) fn new(shop: &'a AutoCheck) -> Self {
        Self { shop }
    }

    async fn request_number(&self) -> Result<String> {
        self.shop
            .rpc(RpcFunction::GenerateClientNumber, json!({}))
            .execute::<String>()
            .await
    }

    /// Ask the database for the next client number.
    ///
    /// A failed call is retried once after the configured delay.
    pub async fn generate_client_number(&self) -> Result<String> {
        match self.request_number().await {
            Ok(number) => Ok(number),
            Err(e) => {
                let delay = self.shop.options.client_number_retry_delay;
                warn!(
                    "Client number generation failed ({}), retrying in {:?}",
                    e, delay
                );
                tokio::time::sleep(delay).await;
                self.request_number().await
            }
        }
    }

    /// Create a client with complete contact details
    pub async fn create_client(&self, contact: &ContactInfo) -> Result<SavedClient> {
        contact.validate()?;
        let number = self.generate_client_number().await?;

        let row: ClientRow = self
            .shop
            .from(Table::Clients)
            .insert(NewClient::complete(number, contact))
            .single()
            .await?;
        info!("Created client {}", row.client_number);

        self.saved(row).await
    }

    /// Replace a client's contact details
    pub async fn update_contact(&self, id: &str, contact: &ContactInfo) -> Result<SavedClient> {
        contact.validate()?;
        let row: ClientRow = self
            .shop
            .from(Table::Clients)
            .update(ContactPatch::from(contact))
            .eq("id", id)
            .single()
            .await?;
        info!("Updated contact details of client {}", row.client_number);

        self.saved(row).await
    }

    async fn saved(&self, row: ClientRow) -> Result<SavedClient> {
        let client = Client::from(row);
        let password = if client.is_complete() {
            self.issue_credentials(&client).await
        } else {
            None
        };
        Ok(SavedClient { client, password })
    }

    /// Credentials are best effort: a failure is logged and the client kept
    async fn issue_credentials(&self, client: &Client) -> Option<String> {
        match self.generate_credentials(&client.id).await {
            Ok(password) => password,
            Err(e) => {
                warn!(
                    "Could not generate credentials for client {}: {}",
                    client.client_number, e
                );
                None
            }
        }
    }

    /// Generate a portal password for a client.
    ///
    /// Returns `None` when the procedure reports no success.
    pub async fn generate_credentials(&self, client_id: &str) -> Result<Option<String>> {
        let response: CredentialsResponse = self
            .shop
            .rpc(
                RpcFunction::GenerateClientCredentials,
                json!({ "client_id_input": client_id }),
            )
            .execute()
            .await?;

        if response.success {
            Ok(response.password)
        } else {
            if let Some(error) = &response.error {
                warn!("Credentials not generated for {}: {}", client_id, error);
            }
            Ok(None)
        }
    }

    /// Issue credentials for an existing, complete client
    pub async fn credentials_for(&self, client: &Client) -> Result<Option<String>> {
        client.require_complete()?;
        self.generate_credentials(&client.id).await
    }

    /// Look up a client by its human-readable number
    pub async fn find_by_number(&self, client_number: &str) -> Result<Client> {
        let row: Option<ClientRow> = self
            .shop
            .from(Table::Clients)
            .select("*")
            .eq("client_number", client_number)
            .maybe_single()
            .await?;
        row.map(Client::from)
            .ok_or_else(|| Error::not_found(format!("client {}", client_number)))
    }

    /// Look up a client by id
    pub async fn find_by_id(&self, id: &str) -> Result<Client> {
        let row: Option<ClientRow> = self
            .shop
            .from(Table::Clients)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await?;
        row.map(Client::from)
            .ok_or_else(|| Error::not_found(format!("client id {}", id)))
    }

    /// Complete an incomplete client from the recovery form.
    ///
    /// Returns `Ok(false)` without a request when a field is blank.
    pub async fn recover_incomplete(
        &self,
        id: &str,
        name: &str,
        phone: &str,
        email: &str,
    ) -> Result<bool> {
        if !validate_contact(name, phone, email) {
            return Ok(false);
        }
        let contact = ContactInfo::new(name, phone, email)?;
        self.update_contact(id, &contact).await?;
        info!("Recovered client {}", id);
        Ok(true)
    }
}

/// All three contact fields are filled in
pub fn validate_contact(name: &str, phone: &str, email: &str) -> bool {
    ContactInfo::new(name, phone, email).is_ok()
}

/// A row counts as complete only with a real name, a phone and an email
pub fn is_complete(row: &ClientRow) -> bool {
    row.contact().is_some()
}
