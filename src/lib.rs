//! AutoCheck client library
//!
//! Drives a vehicle service shop's intake, approval and tracking flows
//! against its hosted database, storage, auth and edge functions.

pub mod auth;
pub mod checkout;
pub mod client_auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod functions;
pub mod intake;
pub mod media;
pub mod model;
pub mod parts;
pub mod portal;
pub mod progress;
pub mod quality;
pub mod rest;
pub mod staff;
pub mod storage;
pub mod workflow;

use reqwest::Client;
use serde::Serialize;

use crate::auth::Auth;
use crate::client_auth::ClientAuth;
use crate::clients::Clients;
use crate::config::{ClientOptions, ShopConfig};
use crate::error::Result;
use crate::functions::FunctionsClient;
use crate::portal::Portal;
use crate::quality::Quality;
use crate::rest::{PostgrestClient, RpcBuilder, RpcFunction, Table};
use crate::staff::Staff;
use crate::storage::StorageClient;

/// The main entry point for the AutoCheck client
#[derive(Debug, Clone)]
pub struct AutoCheck {
    /// The base URL of the project
    pub url: String,
    /// The anonymous API key of the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Staff authentication and the signed-in session
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl AutoCheck {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use autocheck::AutoCheck;
    ///
    /// let shop = AutoCheck::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// ```
    pub fn new(url: &str, key: &str) -> Result<Self> {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use autocheck::{AutoCheck, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_media_bucket("intake-media")
    ///     .with_request_timeout(Some(Duration::from_secs(10)));
    /// let shop = AutoCheck::new_with_options(
    ///     "https://your-project.supabase.co",
    ///     "your-anon-key",
    ///     options,
    /// ).unwrap();
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        let url = url.trim_end_matches('/').to_string();

        let auth = Auth::new(
            &url,
            key,
            http_client.clone(),
            options.auth_redirect_url.clone(),
        );

        Ok(Self {
            url,
            key: key.to_string(),
            http_client,
            auth,
            options,
        })
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &ShopConfig) -> Result<Self> {
        Self::new_with_options(config.url.as_str(), &config.anon_key, config.options.clone())
    }

    /// Create a client from `AUTOCHECK_*` / `SUPABASE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ShopConfig::from_env()?)
    }

    /// Get a reference to the staff auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Bearer token for data requests: the staff session when signed in
    fn token(&self) -> Option<String> {
        self.auth.access_token()
    }

    /// Create a PostgrestClient for one table
    ///
    /// # Example
    ///
    /// ```
    /// use autocheck::{AutoCheck, rest::Table};
    ///
    /// let shop = AutoCheck::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// let checkins = shop.from(Table::Checkins);
    /// ```
    pub fn from(&self, table: Table) -> PostgrestClient {
        PostgrestClient::new(
            &self.url,
            &self.key,
            self.token(),
            &self.options.db_schema,
            table,
            self.http_client.clone(),
        )
    }

    /// Call a stored procedure
    pub fn rpc<T: Serialize>(&self, function: RpcFunction, params: T) -> RpcBuilder<T> {
        rest::rpc(
            &self.url,
            &self.key,
            self.token(),
            &self.options.db_schema,
            function,
            params,
            self.http_client.clone(),
        )
    }

    /// Get a storage client for file operations
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(&self.url, &self.key, self.token(), self.http_client.clone())
    }

    /// Get a functions client for edge function calls
    pub fn functions(&self) -> FunctionsClient {
        FunctionsClient::new(&self.url, &self.key, self.http_client.clone())
    }

    /// Client records: numbering, contact details and credentials
    pub fn clients(&self) -> Clients<'_> {
        Clients::new(self)
    }

    /// Customer login with client number and password
    pub fn client_auth(&self) -> ClientAuth<'_> {
        ClientAuth::new(self)
    }

    /// Customer-facing tracking and approvals
    pub fn portal(&self) -> Portal<'_> {
        Portal::new(self)
    }

    /// Data quality reports over client records
    pub fn quality(&self) -> Quality<'_> {
        Quality::new(self)
    }

    /// Staff accounts and roles
    pub fn staff(&self) -> Staff<'_> {
        Staff::new(self)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::checkout::CheckoutForm;
    pub use crate::config::{ClientOptions, ShopConfig};
    pub use crate::error::{Error, Result};
    pub use crate::intake::CheckinWizard;
    pub use crate::media::{MediaItem, MediaRef};
    pub use crate::model::{Client, ContactInfo};
    pub use crate::parts::PartsForm;
    pub use crate::progress::Progress;
    pub use crate::workflow::{Gate, GateState, WorkflowStage};
    pub use crate::AutoCheck;
}
