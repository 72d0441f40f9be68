//! Selectors describe which data a backup run covers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::InvalidOperationError;

/// A source service that can be backed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// No service selected.
    Unknown,
    /// Mailboxes: email, contacts, events.
    Exchange,
    /// Personal drives.
    OneDrive,
    /// Team sites and libraries.
    SharePoint,
}

impl Default for Service {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Exchange => write!(f, "exchange"),
            Self::OneDrive => write!(f, "onedrive"),
            Self::SharePoint => write!(f, "sharepoint"),
        }
    }
}

/// Service hint handed to the backup engine for laying out snapshot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathService {
    /// No usable path service.
    Unknown,
    /// Exchange mailbox data.
    ExchangeService,
    /// OneDrive drive data.
    OneDriveService,
    /// SharePoint site data.
    SharePointService,
}

impl fmt::Display for PathService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UnknownService"),
            Self::ExchangeService => write!(f, "ExchangeService"),
            Self::OneDriveService => write!(f, "OneDriveService"),
            Self::SharePointService => write!(f, "SharePointService"),
        }
    }
}

/// Describes the scope of a backup: one service and the resource owners
/// whose data is included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// The service to back up.
    pub service: Service,
    /// Resource owners in scope (users, mailboxes, sites).
    #[serde(default)]
    pub resource_owners: Vec<String>,
    /// Categories within the service; empty means all.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Selector {
    /// Creates a selector for `service` with no owners.
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self {
            service,
            ..Self::default()
        }
    }

    /// Creates a selector scoped to a single owner.
    #[must_use]
    pub fn for_owner(service: Service, owner: impl Into<String>) -> Self {
        Self::new(service).with_owner(owner)
    }

    /// Adds a resource owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.resource_owners.push(owner.into());
        self
    }

    /// Restricts the selector to a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Returns the path service used by the backup engine.
    #[must_use]
    pub const fn path_service(&self) -> PathService {
        match self.service {
            Service::Unknown => PathService::Unknown,
            Service::Exchange => PathService::ExchangeService,
            Service::OneDrive => PathService::OneDriveService,
            Service::SharePoint => PathService::SharePointService,
        }
    }

    /// Returns true if `category` is in scope.
    #[must_use]
    pub fn includes_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }

    /// Validates that the selector describes a non-empty scope.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationError` for an unknown service, no owners, or
    /// a blank owner.
    pub fn validate(&self) -> Result<(), InvalidOperationError> {
        if self.service == Service::Unknown {
            return Err(InvalidOperationError::new("selector has no service").with_field("selector.service"));
        }

        if self.resource_owners.is_empty() {
            return Err(InvalidOperationError::new("selector has no resource owners")
                .with_field("selector.resource_owners"));
        }

        if self.resource_owners.iter().any(|o| o.trim().is_empty()) {
            return Err(InvalidOperationError::new("selector contains a blank resource owner")
                .with_field("selector.resource_owners"));
        }

        Ok(())
    }
}
