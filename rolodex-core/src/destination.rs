//! Database pages and their adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contact::{non_empty, property, ContactFields};

/// A page from a database query. Property values are kept untyped; reads go
/// through [`DatabasePage::get_text_property`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabasePage {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl DatabasePage {
    pub fn page_id(&self) -> &str {
        &self.id
    }

    /// Plain text of the first run of a text property.
    ///
    /// The property's `type` field names the key holding its runs (`title` or
    /// `rich_text`). A missing property, a mismatched shape, or an empty string
    /// all read as `None`.
    pub fn get_text_property(&self, name: &str) -> Option<String> {
        let prop = self.properties.get(name)?;
        let kind = prop.get("type")?.as_str()?;
        let text = prop.get(kind)?.get(0)?.get("plain_text")?.as_str();
        non_empty(text)
    }
}

pub(crate) fn normalize(page: &DatabasePage) -> ContactFields {
    ContactFields {
        identity_key: page.get_text_property(property::CONTACT_ID),
        full_name: page.get_text_property(property::NAME),
        first_name: page.get_text_property(property::FIRST_NAME),
        last_name: page.get_text_property(property::LAST_NAME),
        organization: page.get_text_property(property::ORGANIZATION),
        title: page.get_text_property(property::TITLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(properties: Value) -> DatabasePage {
        serde_json::from_value(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "properties": properties,
        }))
        .expect("decode page")
    }

    #[test]
    fn reads_title_and_rich_text() {
        let p = page(json!({
            "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Jane Foe"}]},
            "contactId": {"type": "rich_text", "rich_text": [{"plain_text": "c1"}]}
        }));
        assert_eq!(p.get_text_property("Name").as_deref(), Some("Jane Foe"));
        assert_eq!(p.get_text_property("contactId").as_deref(), Some("c1"));
    }

    #[test]
    fn structural_mismatches_read_as_absent() {
        let p = page(json!({
            "NoRuns": {"type": "rich_text", "rich_text": []},
            "WrongShape": {"type": "rich_text", "rich_text": "not-a-list"},
            "NoType": {"rich_text": [{"plain_text": "x"}]},
            "TypeMismatch": {"type": "title", "rich_text": [{"plain_text": "x"}]},
            "NullText": {"type": "rich_text", "rich_text": [{"plain_text": null}]}
        }));
        for name in ["NoRuns", "WrongShape", "NoType", "TypeMismatch", "NullText", "Missing"] {
            assert_eq!(p.get_text_property(name), None, "{name}");
        }
    }

    #[test]
    fn page_without_properties_normalizes_to_empty_fields() {
        let p: DatabasePage = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(normalize(&p), ContactFields::default());
        assert_eq!(p.page_id(), "abc");
    }
}
