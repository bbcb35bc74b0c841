//! Shared sync pipeline entrypoint used by `rolodex sync` and `rolodex diff`.
//!
//! 1. Fetch every source connection; drop ineligible ones (no name entry).
//! 2. Fetch every linked destination page.
//! 3. Normalize both sides.
//! 4. Reconcile.
//! 5. Apply each change with one create/update call (skipped in dry-run).
//!
//! Both snapshots are fully fetched before any write is computed.

use std::path::Path;

use rolodex_core::{
    is_eligible, reconcile, CanonicalContact, ChangeKind, ChangeRequest, ReconcileSummary,
};

use crate::client::{DestinationApi, SourceApi};
use crate::config::Config;
use crate::error::SyncError;
use crate::notion::NotionClient;
use crate::oauth::OAuthClient;
use crate::people::PeopleClient;
use crate::token_store;

/// Options for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute and report changes without calling the destination.
    pub dry_run: bool,
    /// Restrict the run to one kind of change.
    pub only: Option<ChangeKind>,
}

/// Outcome of applying a single change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// A new destination page was created.
    Created { contact: String, page_id: String },
    /// An existing destination page was updated.
    Updated { contact: String, page_id: String },
    /// `--dry-run` mode: the page *would* have been created.
    WouldCreate { contact: String },
    /// `--dry-run` mode: the page *would* have been updated.
    WouldUpdate { contact: String, page_id: String },
}

/// Everything computed before any write happens.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Connections fetched from the source, before filtering.
    pub fetched: usize,
    /// Connections skipped for having no name entry.
    pub skipped: usize,
    /// Linked pages fetched from the destination.
    pub destination: usize,
    pub summary: ReconcileSummary,
    pub changes: Vec<ChangeRequest>,
}

/// Outcome of a sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub plan: SyncPlan,
    pub applied: Vec<ApplyResult>,
}

impl SyncReport {
    /// Totals of what this run applied, by kind.
    pub fn counts(&self) -> ApplyCounts {
        let created = self
            .applied
            .iter()
            .filter(|r| matches!(r, ApplyResult::Created { .. } | ApplyResult::WouldCreate { .. }))
            .count();
        let pending = self.plan.summary.creates + self.plan.summary.updates;
        ApplyCounts {
            created,
            updated: self.applied.len() - created,
            unchanged: self.plan.summary.unchanged,
            filtered_out: pending.saturating_sub(self.applied.len()),
        }
    }
}

/// Per-kind totals of [`SyncReport::applied`]. In dry-run mode `created` and
/// `updated` count the writes that would have been made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Changes found by reconcile but left out by `SyncOptions::only`.
    pub filtered_out: usize,
}

/// Label used in logs and CLI output: full name, else identity key.
pub fn contact_label(contact: &CanonicalContact) -> String {
    contact
        .full_name()
        .or_else(|| contact.identity_key())
        .unwrap_or("<unnamed>")
        .to_string()
}

/// Fetch both sides and compute the changes, without writing anything.
pub fn plan(
    source: &impl SourceApi,
    destination: &impl DestinationApi,
    database_id: &str,
    only: Option<ChangeKind>,
) -> Result<SyncPlan, SyncError> {
    let connections = source.list_connections()?;
    let pages = destination.query_linked_pages(database_id)?;

    let fetched = connections.len();
    let source_contacts = connections
        .into_iter()
        .filter(is_eligible)
        .map(CanonicalContact::from_source)
        .collect::<Result<Vec<_>, _>>()?;
    let skipped = fetched - source_contacts.len();
    if skipped > 0 {
        tracing::info!("skipped {skipped} connections without a name");
    }

    let destination_total = pages.len();
    let destination_contacts: Vec<_> = pages
        .into_iter()
        .map(CanonicalContact::from_destination)
        .collect();

    tracing::info!(
        "calculating changes for {} connections and {} pages",
        source_contacts.len(),
        destination_total
    );
    let mut changes = reconcile(&source_contacts, &destination_contacts);
    let summary = ReconcileSummary::from_changes(source_contacts.len(), &changes);
    if let Some(kind) = only {
        changes.retain(|c| c.kind() == kind);
    }
    tracing::info!("found {} changes", changes.len());

    Ok(SyncPlan {
        fetched,
        skipped,
        destination: destination_total,
        summary,
        changes,
    })
}

/// Run the full pipeline: plan, then apply every change in order.
///
/// Stops at the first failed write; writes already made are not rolled back.
pub fn run(
    source: &impl SourceApi,
    destination: &impl DestinationApi,
    database_id: &str,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let plan = plan(source, destination, database_id, options.only)?;
    let mut applied = Vec::with_capacity(plan.changes.len());
    for change in &plan.changes {
        applied.push(apply(destination, change, database_id, options.dry_run)?);
    }
    if options.dry_run {
        tracing::info!("sync run complete (dry run, nothing written)");
    } else {
        tracing::info!("sync run complete");
    }
    Ok(SyncReport { plan, applied })
}

fn apply(
    destination: &impl DestinationApi,
    change: &ChangeRequest,
    database_id: &str,
    dry_run: bool,
) -> Result<ApplyResult, SyncError> {
    let contact = contact_label(change.source());
    let write = change.to_write_payload(database_id)?;
    if dry_run {
        tracing::info!("[dry-run] would {}: {contact}", change.kind());
    }

    let result = match (change.kind(), dry_run) {
        (ChangeKind::Create, true) => ApplyResult::WouldCreate { contact },
        (ChangeKind::Update, true) => ApplyResult::WouldUpdate {
            contact,
            page_id: write.page_id.unwrap_or_default(),
        },
        (ChangeKind::Create, false) => {
            let page_id = destination.create_page(&write)?;
            tracing::info!("created {contact} ({page_id})");
            ApplyResult::Created { contact, page_id }
        }
        (ChangeKind::Update, false) => {
            let page_id = destination.update_page(&write)?;
            tracing::info!("updated {contact} ({page_id})");
            ApplyResult::Updated { contact, page_id }
        }
    };
    Ok(result)
}

/// Build authenticated API clients from the config and stored refresh token.
pub fn connect_at(home: &Path, config: &Config) -> Result<(PeopleClient, NotionClient), SyncError> {
    let subject = &config.google.subject;
    let refresh_token = token_store::get_token_at(home, subject)?.ok_or_else(|| {
        SyncError::NoRefreshToken {
            subject: subject.clone(),
        }
    })?;
    let access_token = OAuthClient::new(config).refresh_access_token(&refresh_token)?;
    Ok((
        PeopleClient::new(&config.endpoints, access_token),
        NotionClient::new(&config.endpoints, config.notion.token.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rolodex_core::{DatabasePage, PageWrite, PersonConnection};
    use tempfile::TempDir;

    struct CaptureLog(Mutex<Vec<String>>);

    impl tracing::Log for CaptureLog {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &tracing::Record<'_>) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLog = CaptureLog(Mutex::new(Vec::new()));

    struct Empty;

    impl SourceApi for Empty {
        fn list_connections(&self) -> Result<Vec<PersonConnection>, SyncError> {
            Ok(Vec::new())
        }
    }

    impl DestinationApi for Empty {
        fn query_linked_pages(&self, _: &str) -> Result<Vec<DatabasePage>, SyncError> {
            Ok(Vec::new())
        }

        fn create_page(&self, _: &PageWrite) -> Result<String, SyncError> {
            unreachable!("nothing to create")
        }

        fn update_page(&self, _: &PageWrite) -> Result<String, SyncError> {
            unreachable!("nothing to update")
        }
    }

    #[test]
    fn end_of_run_is_logged_for_dry_and_real_runs() {
        let _ = tracing::set_logger(&CAPTURE);
        tracing::set_max_level(tracing::LevelFilter::Info);

        for dry_run in [true, false] {
            let options = SyncOptions {
                dry_run,
                only: None,
            };
            run(&Empty, &Empty, "db", &options).expect("run");
        }

        let lines = CAPTURE.0.lock().expect("log lines");
        assert!(lines.iter().any(|l| l == "sync run complete"), "got: {lines:?}");
        assert!(
            lines.iter().any(|l| l == "sync run complete (dry run, nothing written)"),
            "got: {lines:?}"
        );
    }

    #[test]
    fn connect_without_stored_token_asks_for_auth() {
        let home = TempDir::new().expect("home");
        let err = connect_at(home.path(), &Config::default()).err().expect("error");
        assert!(matches!(err, SyncError::NoRefreshToken { ref subject } if subject == "default"));
        assert!(err.to_string().contains("rolodex auth exchange"));
    }
}
