//! Address-book client (People API, `people/me/connections`).

use serde::Deserialize;

use rolodex_core::PersonConnection;

use crate::client::{bearer, http_agent, SourceApi};
use crate::config::Endpoints;
use crate::error::{decode_err, http_err, SyncError};

const PERSON_FIELDS: &str = "names,emailAddresses,organizations";
const PAGE_SIZE: &str = "1000";

pub struct PeopleClient {
    agent: ureq::Agent,
    connections_url: String,
    access_token: String,
}

/// One page of `people.connections.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionsPage {
    #[serde(default)]
    connections: Vec<PersonConnection>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl PeopleClient {
    pub fn new(endpoints: &Endpoints, access_token: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            connections_url: format!(
                "{}/v1/people/me/connections",
                endpoints.people.trim_end_matches('/')
            ),
            access_token: access_token.into(),
        }
    }

    fn fetch_page(&self, page_token: Option<&str>) -> Result<ConnectionsPage, SyncError> {
        let endpoint = self.connections_url.as_str();
        let mut request = self
            .agent
            .get(endpoint)
            .set("Authorization", &bearer(&self.access_token))
            .query("personFields", PERSON_FIELDS)
            .query("pageSize", PAGE_SIZE);
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }
        request
            .call()
            .map_err(|e| http_err(endpoint, e))?
            .into_json()
            .map_err(|e| decode_err(endpoint, e))
    }
}

impl SourceApi for PeopleClient {
    fn list_connections(&self) -> Result<Vec<PersonConnection>, SyncError> {
        let mut connections = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.fetch_page(page_token.as_deref())?;
            connections.extend(page.connections);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        tracing::info!("downloaded {} connections", connections.len());
        Ok(connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_page_decodes_last_page() {
        let page: ConnectionsPage = serde_json::from_str(
            r#"{"connections":[{"resourceName":"people/c1","names":[{"givenName":"Jane"}]}],
                "totalPeople":1,"totalItems":1}"#,
        )
        .unwrap();
        assert_eq!(page.connections.len(), 1);
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn empty_address_book_has_no_connections_key() {
        let page: ConnectionsPage = serde_json::from_str(r#"{"totalItems":0}"#).unwrap();
        assert!(page.connections.is_empty());
    }

    #[test]
    fn connections_url_tolerates_trailing_slash() {
        let endpoints = Endpoints {
            people: "http://localhost:8080/".to_string(),
            ..Endpoints::default()
        };
        let client = PeopleClient::new(&endpoints, "token");
        assert_eq!(client.connections_url, "http://localhost:8080/v1/people/me/connections");
    }
}
