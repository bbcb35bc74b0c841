//! Destination database client (Notion API).

use serde::Deserialize;
use serde_json::{json, Value};

use rolodex_core::{contact::property, ContactError, DatabasePage, PageWrite};

use crate::client::{bearer, http_agent, DestinationApi};
use crate::config::Endpoints;
use crate::error::{decode_err, http_err, SyncError};

pub const NOTION_VERSION: &str = "2022-06-28";
const QUERY_PAGE_SIZE: u32 = 100;

pub struct NotionClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

/// One page of `databases.query` results.
#[derive(Debug, Deserialize)]
struct QueryResults {
    #[serde(default)]
    results: Vec<DatabasePage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

/// Query body selecting pages already linked to a source contact. Pages a
/// user created by hand have no `contactId` and are never synced.
pub fn linked_pages_query(start_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": {
            "property": property::CONTACT_ID,
            "rich_text": { "is_not_empty": true }
        },
        "page_size": QUERY_PAGE_SIZE,
    });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::from(cursor);
    }
    body
}

impl NotionClient {
    pub fn new(endpoints: &Endpoints, token: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            base_url: format!("{}/v1", endpoints.notion.trim_end_matches('/')),
            token: token.into(),
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &bearer(&self.token))
            .set("Notion-Version", NOTION_VERSION)
    }

    fn send<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        url: &str,
        body: &Value,
    ) -> Result<T, SyncError> {
        self.request(method, url)
            .send_json(body)
            .map_err(|e| http_err(url, e))?
            .into_json()
            .map_err(|e| decode_err(url, e))
    }
}

impl DestinationApi for NotionClient {
    fn query_linked_pages(&self, database_id: &str) -> Result<Vec<DatabasePage>, SyncError> {
        let url = format!("{}/databases/{database_id}/query", self.base_url);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let body = linked_pages_query(cursor.as_deref());
            let batch: QueryResults = self.send("POST", &url, &body)?;
            pages.extend(batch.results);
            match (batch.has_more, batch.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }
        tracing::info!("retrieved {} linked pages", pages.len());
        Ok(pages)
    }

    fn create_page(&self, write: &PageWrite) -> Result<String, SyncError> {
        let url = format!("{}/pages", self.base_url);
        let body = serde_json::to_value(write)?;
        let page: PageRef = self.send("POST", &url, &body)?;
        Ok(page.id)
    }

    fn update_page(&self, write: &PageWrite) -> Result<String, SyncError> {
        let page_id = write
            .page_id
            .as_deref()
            .ok_or(ContactError::MissingPageId { identity_key: None })?;
        // The page id travels in the path; parent is not accepted on update.
        let url = format!("{}/pages/{page_id}", self.base_url);
        let body = json!({ "properties": write.properties });
        let page: PageRef = self.send("PATCH", &url, &body)?;
        Ok(page.id)
    }
}
