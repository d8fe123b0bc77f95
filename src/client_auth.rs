//! Customer login with client number and password

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::rest::RpcFunction;
use crate::AutoCheck;

/// Default location of the saved customer session
pub const DEFAULT_SESSION_FILE: &str = ".autocheck/client_session.json";

/// Reply of the credential check procedure
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCredentialsResponse {
    pub success: bool,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A signed-in customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub id: String,
    pub client_number: String,
    pub customer_name: String,
}

impl ClientSession {
    /// A customer may only open their own portal page
    pub fn authorizes(&self, client_number: &str) -> bool {
        self.client_number == client_number
    }
}

impl TryFrom<VerifyCredentialsResponse> for ClientSession {
    type Error = Error;

    fn try_from(response: VerifyCredentialsResponse) -> Result<Self> {
        if !response.success {
            return Err(Error::auth(
                response
                    .error
                    .unwrap_or_else(|| "Invalid credentials".to_string()),
            ));
        }
        match (response.client_id, response.client_number) {
            (Some(id), Some(client_number)) => Ok(ClientSession {
                id,
                client_number,
                customer_name: response.customer_name.unwrap_or_default(),
            }),
            _ => Err(Error::auth("credential check succeeded without a client")),
        }
    }
}

/// Customer sign-in against the credential procedure
pub struct ClientAuth<'a> {
    shop: &'a AutoCheck,
}

impl<'a> ClientAuth<'a> {
    pub(crate) fn new(shop: &'a AutoCheck) -> Self {
        Self { shop }
    }

    /// Check a client number and password
    pub async fn sign_in(&self, client_number: &str, password: &str) -> Result<ClientSession> {
        let response: VerifyCredentialsResponse = self
            .shop
            .rpc(
                RpcFunction::VerifyClientCredentials,
                json!({
                    "client_number_input": client_number.trim(),
                    "password_input": password,
                }),
            )
            .execute()
            .await?;

        let session = ClientSession::try_from(response)?;
        info!("Client {} signed in", session.client_number);
        Ok(session)
    }
}

/// Saved customer session on disk
#[derive(Debug, Clone)]
pub struct ClientSessionStore {
    path: PathBuf,
}

impl Default for ClientSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_FILE)
    }
}

impl ClientSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, session: &ClientSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    /// The saved session. An unreadable file is discarded.
    pub fn load(&self) -> Option<ClientSession> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding corrupt session file {}: {}", self.path.display(), e);
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
