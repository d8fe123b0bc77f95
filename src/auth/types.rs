//! Types for staff authentication

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::Session;

/// Token response of the password grant (and of sign-up when email
/// confirmation is disabled)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthResponse {
    /// Session to keep for subsequent requests
    pub fn session(&self) -> Session {
        let mut session = Session::new(
            self.access_token.clone(),
            self.refresh_token.clone(),
            self.user.id.clone(),
            self.expires_in,
        );
        if let Some(expires_at) = self.expires_at {
            session.expires_at = Some(expires_at);
        }
        session
    }
}

/// Outcome of a sign-up request
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in
    SignedIn(AuthResponse),

    /// A confirmation email was sent; no session yet
    ConfirmationSent(User),
}

impl SignUpOutcome {
    pub fn user(&self) -> &User {
        match self {
            SignUpOutcome::SignedIn(response) => &response.user,
            SignUpOutcome::ConfirmationSent(user) => user,
        }
    }
}

/// Staff user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub email_confirmed_at: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Display name from the sign-up metadata, if one was given
    pub fn display_name(&self) -> Option<&str> {
        ["full_name", "name"]
            .iter()
            .filter_map(|key| self.user_metadata.get(*key))
            .find_map(|value| value.as_str())
    }
}
