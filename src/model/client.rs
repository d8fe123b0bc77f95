//! Client records and their completion state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name written for a client whose contact details are not collected yet
pub const PENDING_NAME: &str = "Pending";

/// Name, phone and email of a customer, all non-blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    /// Build contact details from form input, trimming every field.
    ///
    /// Blank fields and the placeholder name are rejected.
    pub fn new(name: &str, phone: &str, email: &str) -> Result<Self> {
        let contact = ContactInfo {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            email: email.trim().to_string(),
        };
        contact.validate()?;
        Ok(contact)
    }

    /// Check the fields without consuming them
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() || self.name.trim() == PENDING_NAME {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "customer {} required",
                missing.join(", ")
            )))
        }
    }
}

/// A `clients` row as stored by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRow {
    pub id: String,
    pub client_number: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClientRow {
    /// Contact details, or `None` while the row holds the placeholder name
    /// or lacks a phone or email
    pub fn contact(&self) -> Option<ContactInfo> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let name = non_blank(&self.customer_name).filter(|name| name != PENDING_NAME)?;
        Some(ContactInfo {
            name,
            phone: non_blank(&self.customer_phone)?,
            email: non_blank(&self.customer_email)?,
        })
    }
}

/// A client with its completion state made explicit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: String,
    pub client_number: String,
    /// `None` until name, phone and email have all been collected
    pub contact: Option<ContactInfo>,
    /// Whatever partial name the row holds, placeholder excluded
    pub partial_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        let contact = row.contact();
        let partial_name = row
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != PENDING_NAME)
            .map(str::to_string);
        Client {
            id: row.id,
            client_number: row.client_number,
            contact,
            partial_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Client {
    pub fn is_complete(&self) -> bool {
        self.contact.is_some()
    }

    /// Contact details, or an error pointing to the recovery flow
    pub fn require_complete(&self) -> Result<&ContactInfo> {
        self.contact.as_ref().ok_or_else(|| {
            Error::validation(format!(
                "client {} has incomplete contact details; complete them with `recover` first",
                self.client_number
            ))
        })
    }

    /// Name to show, falling back to the placeholder
    pub fn display_name(&self) -> &str {
        self.contact
            .as_ref()
            .map(|c| c.name.as_str())
            .or(self.partial_name.as_deref())
            .unwrap_or(PENDING_NAME)
    }
}

/// Body of a `clients` insert
#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub client_number: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
}

impl NewClient {
    pub fn complete(client_number: String, contact: &ContactInfo) -> Self {
        NewClient {
            client_number,
            customer_name: contact.name.clone(),
            customer_phone: Some(contact.phone.clone()),
            customer_email: Some(contact.email.clone()),
        }
    }
}

/// Body of a contact update
#[derive(Debug, Clone, Serialize)]
pub struct ContactPatch {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
}

impl From<&ContactInfo> for ContactPatch {
    fn from(contact: &ContactInfo) -> Self {
        ContactPatch {
            customer_name: contact.name.clone(),
            customer_phone: contact.phone.clone(),
            customer_email: contact.email.clone(),
        }
    }
}

/// Row of the incomplete-clients report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: String,
    pub client_number: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_checkin: bool,
}
