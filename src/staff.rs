//! Staff accounts: sign-up with confirmation email, sign-in and roles

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::auth::{AuthResponse, SignUpOutcome, User};
use crate::error::{Error, Result};
use crate::functions::ConfirmationEmail;
use crate::rest::RpcFunction;
use crate::AutoCheck;

/// Role a staff member can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Mechanic,
    Supervisor,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Mechanic => "mechanic",
            StaffRole::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mechanic" => Ok(StaffRole::Mechanic),
            "supervisor" => Ok(StaffRole::Supervisor),
            other => Err(Error::validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Staff account operations
pub struct Staff<'a> {
    shop: &'a AutoCheck,
}

impl<'a> Staff<'a> {
    pub(crate) fn new(shop: &'a AutoCheck) -> Self {
        Self { shop }
    }

    /// Register a staff member, then ask for the welcome email.
    ///
    /// The email is best effort and never fails the sign-up.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let outcome = self.shop.auth().sign_up(email, password).await?;

        let request = ConfirmationEmail {
            email: email.to_string(),
            name: name.map(str::to_string),
        };
        let function = &self.shop.options.confirmation_function;
        match self
            .shop
            .functions()
            .send_confirmation_email(function, request)
            .await
        {
            Ok(()) => info!("Confirmation email requested for {}", email),
            Err(e) => warn!("Confirmation email for {} failed: {}", email, e),
        }

        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let response = self.shop.auth().sign_in(email, password).await?;
        info!("Staff member {} signed in", email);
        Ok(response)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.shop.auth().sign_out().await
    }

    /// Send a password reset link
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        self.shop.auth().reset_password_for_email(email).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.shop.auth().get_user().await
    }

    /// Whether a user holds a role
    pub async fn has_role(&self, user_id: &str, role: StaffRole) -> Result<bool> {
        self.shop
            .rpc(
                RpcFunction::HasRole,
                json!({ "_user_id": user_id, "_role": role }),
            )
            .execute::<bool>()
            .await
    }

    /// Whether the signed-in staff member holds a role
    pub async fn current_has_role(&self, role: StaffRole) -> Result<bool> {
        let session = self
            .shop
            .auth()
            .get_session()
            .ok_or_else(|| Error::auth("Not logged in"))?;
        let claims = session.claims()?;
        self.has_role(&claims.sub, role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_and_serialize() {
        assert_eq!("Supervisor".parse::<StaffRole>().unwrap(), StaffRole::Supervisor);
        assert!("owner".parse::<StaffRole>().is_err());
        assert_eq!(serde_json::to_value(StaffRole::Mechanic).unwrap(), "mechanic");
    }
}
