//! Canonical contact model.
//!
//! Both sides of a sync are normalized into [`CanonicalContact`] before they
//! are compared. The raw record is kept alongside the normalized fields so a
//! write can be routed back to the destination page it came from, but it never
//! takes part in comparison.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::destination::{self, DatabasePage};
use crate::error::ContactError;
use crate::source::{self, PersonConnection};

// ---------------------------------------------------------------------------
// Destination property names
// ---------------------------------------------------------------------------

/// Property names in the destination database.
pub mod property {
    pub const CONTACT_ID: &str = "contactId";
    pub const NAME: &str = "Name";
    pub const FIRST_NAME: &str = "First Name";
    pub const LAST_NAME: &str = "Last Name";
    pub const ORGANIZATION: &str = "Organization";
    pub const TITLE: &str = "Title";
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Which side of the sync a contact was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Destination,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Source => write!(f, "source"),
            Origin::Destination => write!(f, "destination"),
        }
    }
}

/// A record exactly as fetched, tagged with the side it came from.
///
/// Callers always declare the side; nothing is inferred from the shape of the
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Source(PersonConnection),
    Destination(DatabasePage),
}

impl RawRecord {
    pub fn origin(&self) -> Origin {
        match self {
            RawRecord::Source(_) => Origin::Source,
            RawRecord::Destination(_) => Origin::Destination,
        }
    }

    /// Decode an untyped address-book connection.
    pub fn from_source_json(value: Value) -> Result<Self, ContactError> {
        Ok(RawRecord::Source(serde_json::from_value(value)?))
    }

    /// Decode an untyped database page.
    pub fn from_destination_json(value: Value) -> Result<Self, ContactError> {
        Ok(RawRecord::Destination(serde_json::from_value(value)?))
    }
}

// ---------------------------------------------------------------------------
// Canonical contact
// ---------------------------------------------------------------------------

/// The compared part of a contact. Two contacts are content-equal exactly when
/// their `ContactFields` are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContactFields {
    pub identity_key: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub title: Option<String>,
}

/// A contact normalized out of either side of the sync.
///
/// Compare with [`CanonicalContact::content_equals`], which ignores provenance
/// and the raw payload.
#[derive(Debug, Clone)]
pub struct CanonicalContact {
    fields: ContactFields,
    raw: RawRecord,
}

impl CanonicalContact {
    /// Normalize a raw record with the adapter for its side.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ContactError> {
        let fields = match &raw {
            RawRecord::Source(connection) => source::normalize(connection)?,
            RawRecord::Destination(page) => destination::normalize(page),
        };
        Ok(Self { fields, raw })
    }

    /// Normalize an address-book connection.
    ///
    /// The connection must have passed [`source::is_eligible`]; a record with
    /// no name entries is reported as [`ContactError::MalformedSourceRecord`].
    pub fn from_source(connection: PersonConnection) -> Result<Self, ContactError> {
        Self::from_raw(RawRecord::Source(connection))
    }

    /// Normalize a database page. Never fails: unreadable properties are absent.
    pub fn from_destination(page: DatabasePage) -> Self {
        let fields = destination::normalize(&page);
        Self {
            fields,
            raw: RawRecord::Destination(page),
        }
    }

    pub fn origin(&self) -> Origin {
        self.raw.origin()
    }

    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    pub fn identity_key(&self) -> Option<&str> {
        self.fields.identity_key.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.fields.full_name.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.fields.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.fields.last_name.as_deref()
    }

    pub fn organization(&self) -> Option<&str> {
        self.fields.organization.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.title.as_deref()
    }

    /// Destination page id, when this contact was read from the destination.
    pub fn page_id(&self) -> Option<&str> {
        match &self.raw {
            RawRecord::Destination(page) => Some(page.page_id()),
            RawRecord::Source(_) => None,
        }
    }

    /// True when every compared field matches. `origin` and the raw payload
    /// are ignored.
    pub fn content_equals(&self, other: &CanonicalContact) -> bool {
        self.fields == other.fields
    }

    /// Destination property names whose values differ from `other`.
    pub fn changed_properties(&self, other: &CanonicalContact) -> Vec<&'static str> {
        let (a, b) = (&self.fields, &other.fields);
        [
            (property::CONTACT_ID, a.identity_key == b.identity_key),
            (property::NAME, a.full_name == b.full_name),
            (property::FIRST_NAME, a.first_name == b.first_name),
            (property::LAST_NAME, a.last_name == b.last_name),
            (property::ORGANIZATION, a.organization == b.organization),
            (property::TITLE, a.title == b.title),
        ]
        .into_iter()
        .filter(|(_, same)| !same)
        .map(|(name, _)| name)
        .collect()
    }

    /// Destination write properties for every present field.
    ///
    /// Absent fields are left out entirely so a partial write never blanks a
    /// property the source does not supply.
    pub fn to_destination_properties(&self) -> BTreeMap<String, PropertyValue> {
        let f = &self.fields;
        let rich_text: fn(&str) -> PropertyValue = PropertyValue::rich_text;
        [
            (property::CONTACT_ID, &f.identity_key, rich_text),
            (property::NAME, &f.full_name, PropertyValue::title),
            (property::FIRST_NAME, &f.first_name, rich_text),
            (property::LAST_NAME, &f.last_name, rich_text),
            (property::ORGANIZATION, &f.organization, rich_text),
            (property::TITLE, &f.title, rich_text),
        ]
        .into_iter()
        .filter_map(|(name, value, make)| {
            value.as_deref().map(|v| (name.to_string(), make(v)))
        })
        .collect()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(fields: ContactFields, raw: RawRecord) -> Self {
        Self { fields, raw }
    }
}

impl fmt::Display for CanonicalContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let absent = "-";
        writeln!(f, "origin: {}", self.origin())?;
        writeln!(f, "identity_key: {}", self.identity_key().unwrap_or(absent))?;
        writeln!(f, "full_name: {}", self.full_name().unwrap_or(absent))?;
        writeln!(f, "first_name: {}", self.first_name().unwrap_or(absent))?;
        writeln!(f, "last_name: {}", self.last_name().unwrap_or(absent))?;
        writeln!(f, "organization: {}", self.organization().unwrap_or(absent))?;
        writeln!(f, "title: {}", self.title().unwrap_or(absent))
    }
}

/// Empty strings are never stored; they read as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Destination write values
// ---------------------------------------------------------------------------

/// A text run in the destination write shape: `{"text": {"content": "…"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

/// A typed text property value, serialized as `{"title": [...]}` or
/// `{"rich_text": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<TextRun>),
    RichText(Vec<TextRun>),
}

impl PropertyValue {
    pub fn title(content: &str) -> Self {
        PropertyValue::Title(vec![TextRun::new(content)])
    }

    pub fn rich_text(content: &str) -> Self {
        PropertyValue::RichText(vec![TextRun::new(content)])
    }

    /// Concatenated content of every run.
    pub fn plain_text(&self) -> String {
        let runs = match self {
            PropertyValue::Title(runs) | PropertyValue::RichText(runs) => runs,
        };
        runs.iter().map(|r| r.text.content.as_str()).collect()
    }
}

impl TextRun {
    fn new(content: &str) -> Self {
        Self {
            text: TextContent {
                content: content.to_owned(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(key: &str, first: &str) -> ContactFields {
        ContactFields {
            identity_key: Some(key.to_string()),
            first_name: Some(first.to_string()),
            ..Default::default()
        }
    }

    fn page(id: &str) -> RawRecord {
        RawRecord::Destination(DatabasePage {
            id: id.to_string(),
            properties: Default::default(),
        })
    }

    #[test]
    fn origin_display() {
        assert_eq!(Origin::Source.to_string(), "source");
        assert_eq!(Origin::Destination.to_string(), "destination");
    }

    #[test]
    fn content_equality_ignores_raw_payload() {
        let a = CanonicalContact::from_parts(fields("c1", "Jane"), page("page-a"));
        let b = CanonicalContact::from_parts(fields("c1", "Jane"), page("page-b"));
        assert!(a.content_equals(&b));
        assert!(a.content_equals(&a));
    }

    #[test]
    fn absent_and_present_fields_differ() {
        let a = CanonicalContact::from_parts(fields("c1", "Jane"), page("p"));
        let mut other = fields("c1", "Jane");
        other.title = Some("CTO".to_string());
        let b = CanonicalContact::from_parts(other, page("p"));
        assert!(!a.content_equals(&b));
    }

    #[test]
    fn changed_properties_names_each_differing_field() {
        let a = CanonicalContact::from_parts(fields("c1", "Jane"), page("p"));
        let mut other = fields("c1", "Janet");
        other.title = Some("CTO".to_string());
        let b = CanonicalContact::from_parts(other, page("p"));
        assert_eq!(a.changed_properties(&b), vec![property::FIRST_NAME, property::TITLE]);
        assert!(a.changed_properties(&a).is_empty());
    }

    #[test]
    fn title_property_serializes_in_write_shape() {
        let value = serde_json::to_value(PropertyValue::title("Jane Foe")).unwrap();
        assert_eq!(value, json!({"title": [{"text": {"content": "Jane Foe"}}]}));

        let value = serde_json::to_value(PropertyValue::rich_text("c1")).unwrap();
        assert_eq!(value, json!({"rich_text": [{"text": {"content": "c1"}}]}));
    }

    #[test]
    fn display_skips_raw_payload() {
        let c = CanonicalContact::from_parts(fields("c9", "Vinny"), page("secret-page"));
        let rendered = c.to_string();
        assert!(rendered.contains("identity_key: c9"));
        assert!(rendered.contains("title: -"));
        assert!(!rendered.contains("secret-page"));
    }

    #[test]
    fn non_empty_normalizes_blank_to_absent() {
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x")), Some("x".to_string()));
    }
}
