//! Address-book (People API) connection records and their adapter.

use serde::{Deserialize, Serialize};

use crate::contact::{non_empty, ContactFields};
use crate::error::ContactError;

/// A connection as returned by `people/me/connections`.
///
/// Only the fields the sync reads are modelled; everything else in the
/// payload is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonConnection {
    /// `people/<id>`; the `<id>` part is the identity key.
    pub resource_name: String,
    #[serde(default)]
    pub names: Vec<PersonName>,
    #[serde(default)]
    pub organizations: Vec<PersonOrganization>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonOrganization {
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Whether a connection can be synced at all. Connections without a name
/// entry are skipped by callers before adaptation.
pub fn is_eligible(connection: &PersonConnection) -> bool {
    !connection.names.is_empty()
}

/// Second `/`-separated segment of a resource name: `people/c123` → `c123`.
pub fn identity_key_from_resource_name(resource_name: &str) -> Option<&str> {
    resource_name.split('/').nth(1).filter(|id| !id.is_empty())
}

pub(crate) fn normalize(connection: &PersonConnection) -> Result<ContactFields, ContactError> {
    let malformed = |reason| ContactError::MalformedSourceRecord {
        resource_name: connection.resource_name.clone(),
        reason,
    };

    let identity_key = identity_key_from_resource_name(&connection.resource_name)
        .ok_or_else(|| malformed("resource name has no identifier segment"))?;
    // Only the first name entry is synced.
    let name = connection
        .names
        .first()
        .ok_or_else(|| malformed("no name entries"))?;
    let organization = connection.organizations.first();

    Ok(ContactFields {
        identity_key: Some(identity_key.to_owned()),
        full_name: non_empty(name.display_name.as_deref()),
        first_name: non_empty(name.given_name.as_deref()),
        last_name: non_empty(name.family_name.as_deref()),
        organization: organization.and_then(|o| non_empty(o.name.as_deref())),
        title: organization.and_then(|o| non_empty(o.title.as_deref())),
    })
}
