//! Configuration options for the AutoCheck client

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Configuration options for the AutoCheck client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Public bucket holding check-in photos and videos
    pub media_bucket: String,

    /// Pause before the single retry of client number generation
    pub client_number_retry_delay: Duration,

    /// Base URL of the customer-facing site, used to build tracking links
    pub portal_base_url: Option<String>,

    /// Edge function that sends the staff sign-up confirmation
    pub confirmation_function: String,

    /// Where auth emails (sign-up, password reset) send the user back to
    pub auth_redirect_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            media_bucket: "checkin-media".to_string(),
            client_number_retry_delay: Duration::from_millis(1000),
            portal_base_url: None,
            confirmation_function: "send-confirmation-email".to_string(),
            auth_redirect_url: None,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the media bucket
    pub fn with_media_bucket(mut self, value: &str) -> Self {
        self.media_bucket = value.to_string();
        self
    }

    /// Set the delay before retrying client number generation
    pub fn with_client_number_retry_delay(mut self, value: Duration) -> Self {
        self.client_number_retry_delay = value;
        self
    }

    /// Set the portal base URL
    pub fn with_portal_base_url(mut self, value: &str) -> Self {
        self.portal_base_url = Some(value.trim_end_matches('/').to_string());
        self
    }

    /// Set the confirmation email function name
    pub fn with_confirmation_function(mut self, value: &str) -> Self {
        self.confirmation_function = value.to_string();
        self
    }

    /// Set the auth redirect URL
    pub fn with_auth_redirect_url(mut self, value: &str) -> Self {
        self.auth_redirect_url = Some(value.to_string());
        self
    }
}

/// Project endpoint, key and options, usually loaded from the environment
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub url: Url,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl ShopConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: String) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::Config("anon_key cannot be empty".to_string()));
        }
        Ok(Self {
            url,
            anon_key,
            options: ClientOptions::default(),
        })
    }

    /// Replace the options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads the configuration from the environment, loading `.env` first.
    ///
    /// `AUTOCHECK_URL` / `AUTOCHECK_KEY` win over `SUPABASE_URL` /
    /// `SUPABASE_ANON_KEY`. Optional overrides: `AUTOCHECK_MEDIA_BUCKET`,
    /// `AUTOCHECK_PORTAL_URL`, `AUTOCHECK_REDIRECT_URL`, `AUTOCHECK_DB_SCHEMA`,
    /// `AUTOCHECK_CONFIRMATION_FUNCTION`, `AUTOCHECK_TIMEOUT_SECS`,
    /// `AUTOCHECK_RETRY_DELAY_MS`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let url_str = first_var(&["AUTOCHECK_URL", "SUPABASE_URL"]).ok_or_else(|| {
            Error::Config("AUTOCHECK_URL or SUPABASE_URL environment variable not found".to_string())
        })?;
        let anon_key = first_var(&["AUTOCHECK_KEY", "SUPABASE_ANON_KEY", "SUPABASE_KEY"])
            .ok_or_else(|| {
                Error::Config(
                    "AUTOCHECK_KEY or SUPABASE_ANON_KEY environment variable not found".to_string(),
                )
            })?;

        let mut options = ClientOptions::default();
        if let Some(bucket) = first_var(&["AUTOCHECK_MEDIA_BUCKET"]) {
            options = options.with_media_bucket(&bucket);
        }
        if let Some(portal) = first_var(&["AUTOCHECK_PORTAL_URL"]) {
            options = options.with_portal_base_url(&portal);
        }
        if let Some(redirect) = first_var(&["AUTOCHECK_REDIRECT_URL"]) {
            options = options.with_auth_redirect_url(&redirect);
        }
        if let Some(schema) = first_var(&["AUTOCHECK_DB_SCHEMA"]) {
            options = options.with_db_schema(&schema);
        }
        if let Some(function) = first_var(&["AUTOCHECK_CONFIRMATION_FUNCTION"]) {
            options = options.with_confirmation_function(&function);
        }
        if let Some(secs) = first_var(&["AUTOCHECK_TIMEOUT_SECS"]) {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("invalid AUTOCHECK_TIMEOUT_SECS: {}", secs)))?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }
        if let Some(ms) = first_var(&["AUTOCHECK_RETRY_DELAY_MS"]) {
            let ms = ms
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("invalid AUTOCHECK_RETRY_DELAY_MS: {}", ms)))?;
            options = options.with_client_number_retry_delay(Duration::from_millis(ms));
        }

        Ok(Self::new(&url_str, anon_key)?.with_options(options))
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
