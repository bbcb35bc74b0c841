//! `rolodex diff`: list the changes a sync would make.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use rolodex_core::{ChangeKind, ChangeRequest};
use rolodex_sync::{config, pipeline, SyncPlan};

use super::super::ChangeKindArg;

/// Arguments for `rolodex diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only list one kind of change: create | update.
    #[arg(long, value_name = "KIND")]
    pub only: Option<ChangeKindArg>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::resolve().context("configuration is incomplete")?;
        let (people, notion) =
            pipeline::connect_at(&home, &cfg).context("failed to authenticate")?;

        let plan = pipeline::plan(
            &people,
            &notion,
            &cfg.notion.database_id,
            self.only.map(Into::into),
        )
        .context("diff failed")?;

        if self.json {
            let payload = DiffJson {
                summary: plan.summary,
                skipped: plan.skipped,
                changes: plan.changes.iter().map(ChangeRow::from).collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize diff JSON")?
            );
            return Ok(());
        }

        print_table(&plan);
        Ok(())
    }
}

#[derive(Serialize)]
struct DiffJson {
    summary: rolodex_core::ReconcileSummary,
    skipped: usize,
    changes: Vec<ChangeRow>,
}

#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    #[tabled(rename = "action")]
    action: ChangeKind,
    #[tabled(rename = "contact")]
    contact: String,
    #[tabled(rename = "contact id")]
    contact_id: String,
    #[tabled(rename = "page")]
    page_id: String,
    #[tabled(rename = "changed")]
    changed: String,
}

impl From<&ChangeRequest> for ChangeRow {
    fn from(change: &ChangeRequest) -> Self {
        let source = change.source();
        let (page_id, changed) = match change.target() {
            Some(target) => (
                target.page_id().unwrap_or_default().to_string(),
                source.changed_properties(target).join(", "),
            ),
            None => (String::new(), "(new page)".to_string()),
        };
        Self {
            action: change.kind(),
            contact: pipeline::contact_label(source),
            contact_id: source.identity_key().unwrap_or_default().to_string(),
            page_id,
            changed,
        }
    }
}

fn print_table(plan: &SyncPlan) {
    println!(
        "{} to create | {} to update | {} unchanged | {} skipped",
        plan.summary.creates, plan.summary.updates, plan.summary.unchanged, plan.skipped,
    );
    if plan.changes.is_empty() {
        println!("No differences.");
        return;
    }
    let rows: Vec<ChangeRow> = plan.changes.iter().map(ChangeRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
