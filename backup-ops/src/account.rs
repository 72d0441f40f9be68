//! Account and credential context for reaching the data source.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::InvalidOperationError;

/// The account provider hosting the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountProvider {
    /// Microsoft 365 tenants.
    M365,
}

impl fmt::Display for AccountProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::M365 => write!(f, "m365"),
        }
    }
}

/// Account context passed to the connector.
///
/// Credentials are carried opaquely and never logged.
#[derive(Clone, Serialize, Deserialize)]
pub struct Account {
    /// The provider of the account.
    pub provider: AccountProvider,
    /// The tenant identifier.
    pub tenant_id: String,
    /// Provider-specific credential values.
    #[serde(default)]
    credentials: HashMap<String, String>,
}

impl Account {
    /// Creates an account for a tenant.
    #[must_use]
    pub fn new(provider: AccountProvider, tenant_id: impl Into<String>) -> Self {
        Self {
            provider,
            tenant_id: tenant_id.into(),
            credentials: HashMap::new(),
        }
    }

    /// Adds a credential value.
    #[must_use]
    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    /// Returns a credential value.
    #[must_use]
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials.get(key).map(String::as_str)
    }

    /// Validates the account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` if the tenant id is blank.
    pub fn validate(&self) -> Result<(), InvalidOperationError> {
        if self.tenant_id.trim().is_empty() {
            return Err(InvalidOperationError::new("account has no tenant id").with_field("account.tenant_id"));
        }
        Ok(())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.credentials.keys().collect();
        keys.sort();
        f.debug_struct("Account")
            .field("provider", &self.provider)
            .field("tenant_id", &self.tenant_id)
            .field("credential_keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_validate() {
        assert!(Account::new(AccountProvider::M365, "tenant-1").validate().is_ok());
        assert!(Account::new(AccountProvider::M365, " ").validate().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let acct = Account::new(AccountProvider::M365, "tenant-1")
            .with_credential("client_secret", "hunter2");
        let dbg = format!("{acct:?}");
        assert!(dbg.contains("client_secret"));
        assert!(!dbg.contains("hunter2"));
        assert_eq!(acct.credential("client_secret"), Some("hunter2"));
    }
}
