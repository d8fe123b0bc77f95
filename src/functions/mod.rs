//! Edge function client

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Client for edge functions
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client
    client: Client,
}

/// Response from an edge function
#[derive(Debug, Clone)]
pub struct FunctionResponse<T> {
    /// Response data
    pub data: T,

    /// Response status
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,
}

/// Body of the staff sign-up confirmation email request
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationEmail {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FunctionsClient {
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        }
    }

    fn get_url(&self, function_name: &str) -> String {
        format!("{}/functions/v1/{}", self.url, function_name)
    }

    /// Invoke an edge function
    pub async fn invoke<T: Serialize, R: DeserializeOwned>(
        &self,
        function_name: &str,
        invoke_options: &FunctionInvokeOptions<T>,
    ) -> Result<FunctionResponse<R>> {
        let url = self.get_url(function_name);

        let fetch = Fetch::post(&self.client, &url).api_key(&self.key, None);
        let fetch = match &invoke_options.body {
            Some(body) => fetch.json(body)?,
            None => fetch,
        };

        let response = fetch.execute_raw().await?;
        let status = response.status();

        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_str().unwrap_or("").to_string()))
            .collect();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Error::function(format!(
                "Function {} failed with status {}: {}",
                function_name, status, text
            )));
        }

        let data = response.json::<R>().await?;

        Ok(FunctionResponse {
            data,
            status: status.as_u16(),
            headers,
        })
    }

    /// Ask the platform to send the sign-up confirmation email
    pub async fn send_confirmation_email(
        &self,
        function_name: &str,
        request: ConfirmationEmail,
    ) -> Result<()> {
        let options = FunctionInvokeOptions::new().with_body(request);
        self.invoke::<_, serde_json::Value>(function_name, &options)
            .await
            .map(|_| ())
    }
}

/// Options for invoking an edge function
#[derive(Debug, Clone)]
pub struct FunctionInvokeOptions<T> {
    /// Request body
    pub body: Option<T>,
}

impl<T> Default for FunctionInvokeOptions<T> {
    fn default() -> Self {
        Self { body: None }
    }
}

impl<T> FunctionInvokeOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request body
    pub fn with_body(mut self, body: T) -> Self {
        self.body = Some(body);
        self
    }
}
