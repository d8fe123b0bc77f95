//! Staff authentication against the platform auth service

mod session;
mod types;

use log::info;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for staff authentication
#[derive(Debug, Clone)]
pub struct Auth {
    url: String,
    key: String,
    client: Client,
    redirect_to: Option<String>,
    session: Arc<Mutex<Option<Session>>>,
}

impl Auth {
    pub(crate) fn new(url: &str, key: &str, client: Client, redirect_to: Option<String>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
            redirect_to,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn redirect_params(&self) -> Vec<(String, String)> {
        self.redirect_to
            .iter()
            .map(|url| ("redirect_to".to_string(), url.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sign up a new staff member with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let url = self.get_auth_url("/signup");

        let body = Fetch::post(&self.client, &url)
            .api_key(&self.key, None)
            .query(&self.redirect_params())
            .json(&json!({ "email": email, "password": password }))?
            .execute::<Value>()
            .await
            .map_err(|e| Error::auth(format!("sign up failed: {}", e)))?;

        if body.get("access_token").is_some() {
            let response: AuthResponse = serde_json::from_value(body)?;
            self.set_session(response.session());
            info!("Signed up and signed in {}", email);
            Ok(SignUpOutcome::SignedIn(response))
        } else {
            let user: User = match body.get("user") {
                Some(user) => serde_json::from_value(user.clone())?,
                None => serde_json::from_value(body)?,
            };
            info!("Sign-up confirmation sent to {}", email);
            Ok(SignUpOutcome::ConfirmationSent(user))
        }
    }

    /// Sign in a staff member with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = self.get_auth_url("/token?grant_type=password");

        let response = Fetch::post(&self.client, &url)
            .api_key(&self.key, None)
            .json(&json!({ "email": email, "password": password }))?
            .execute::<AuthResponse>()
            .await
            .map_err(|e| Error::auth(format!("sign in failed: {}", e)))?;

        self.set_session(response.session());
        Ok(response)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<()> {
        let token = self
            .access_token()
            .ok_or_else(|| Error::auth("Not logged in"))?;
        let url = self.get_auth_url("/logout");

        Fetch::post(&self.client, &url)
            .api_key(&self.key, Some(&token))
            .execute_empty()
            .await?;

        *self.lock() = None;
        Ok(())
    }

    /// Send a password reset email
    pub async fn reset_password_for_email(&self, email: &str) -> Result<()> {
        let url = self.get_auth_url("/recover");

        Fetch::post(&self.client, &url)
            .api_key(&self.key, None)
            .query(&self.redirect_params())
            .json(&json!({ "email": email }))?
            .execute_empty()
            .await
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<User> {
        let token = self
            .access_token()
            .ok_or_else(|| Error::auth("Not logged in"))?;
        let url = self.get_auth_url("/user");

        Fetch::get(&self.client, &url)
            .api_key(&self.key, Some(&token))
            .execute::<User>()
            .await
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        *self.lock() = Some(session);
    }

    /// Access token of a live session
    pub fn access_token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|session| !session.is_expired())
            .map(|session| session.access_token.clone())
    }
}
