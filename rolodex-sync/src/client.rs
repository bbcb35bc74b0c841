//! Seams between the sync pipeline and the remote APIs.
//!
//! The pipeline only talks to [`SourceApi`] and [`DestinationApi`]; the HTTP
//! clients in [`crate::people`] and [`crate::notion`] implement them, and tests
//! substitute in-memory fakes.

use std::time::Duration;

use rolodex_core::{DatabasePage, PageWrite, PersonConnection};

use crate::error::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Address-book side of the sync.
pub trait SourceApi {
    /// Every connection of the authenticated user, all pages fetched.
    fn list_connections(&self) -> Result<Vec<PersonConnection>, SyncError>;
}

/// Destination database side of the sync.
pub trait DestinationApi {
    /// Every page in `database_id` already linked to a source contact (that
    /// is, with a non-empty `contactId`), all pages fetched.
    fn query_linked_pages(&self, database_id: &str) -> Result<Vec<DatabasePage>, SyncError>;

    /// Create a page; returns the new page id.
    fn create_page(&self, write: &PageWrite) -> Result<String, SyncError>;

    /// Update the page named by `write.page_id`; returns its id.
    fn update_page(&self, write: &PageWrite) -> Result<String, SyncError>;
}

/// Blocking HTTP agent shared by the API clients.
pub(crate) fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("rolodex/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
