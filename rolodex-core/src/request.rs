//! Change requests and their destination write payloads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::contact::{CanonicalContact, PropertyValue};
use crate::error::ContactError;

/// Which destination call a change needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Update => write!(f, "update"),
        }
    }
}

impl FromStr for ChangeKind {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(ChangeKind::Create),
            "update" => Ok(ChangeKind::Update),
            _ => Err(ContactError::UnknownChangeKind(s.to_owned())),
        }
    }
}

/// One pending destination write.
///
/// `target` is present exactly for updates; the constructors are the only way
/// to build one.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    kind: ChangeKind,
    source: CanonicalContact,
    target: Option<CanonicalContact>,
}

impl ChangeRequest {
    pub fn create(source: CanonicalContact) -> Self {
        Self {
            kind: ChangeKind::Create,
            source,
            target: None,
        }
    }

    pub fn update(source: CanonicalContact, target: CanonicalContact) -> Self {
        Self {
            kind: ChangeKind::Update,
            source,
            target: Some(target),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn source(&self) -> &CanonicalContact {
        &self.source
    }

    pub fn target(&self) -> Option<&CanonicalContact> {
        self.target.as_ref()
    }

    /// Build the body for a create-page or update-page call.
    ///
    /// Updates carry the target's page id; creates leave it out so the
    /// destination allocates one.
    pub fn to_write_payload(&self, parent_database_id: &str) -> Result<PageWrite, ContactError> {
        let page_id = match (self.kind, &self.target) {
            (ChangeKind::Create, _) => None,
            (ChangeKind::Update, target) => {
                let page_id = target.as_ref().and_then(|t| t.page_id()).ok_or_else(|| {
                    ContactError::MissingPageId {
                        identity_key: self.source.identity_key().map(str::to_owned),
                    }
                })?;
                Some(page_id.to_owned())
            }
        };

        Ok(PageWrite {
            parent: PageParent::Database {
                database_id: parent_database_id.to_owned(),
            },
            properties: self.source.to_destination_properties(),
            page_id,
        })
    }
}

/// Parent reference of a page write: `{"type": "database_id", "database_id": "…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum PageParent {
    #[serde(rename = "database_id")]
    Database { database_id: String },
}

/// Body of a create-page or update-page call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWrite {
    pub parent: PageParent,
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}
