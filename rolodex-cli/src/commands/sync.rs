//! `rolodex sync`: create and update destination pages from source contacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rolodex_sync::{config, pipeline, ApplyResult, SyncOptions, SyncReport};

use super::super::ChangeKindArg;

/// Arguments for `rolodex sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be written without calling the destination.
    #[arg(long)]
    pub dry_run: bool,

    /// Only apply one kind of change: create | update.
    #[arg(long, value_name = "KIND")]
    pub only: Option<ChangeKindArg>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::resolve().context("configuration is incomplete")?;
        let (people, notion) =
            pipeline::connect_at(&home, &cfg).context("failed to authenticate")?;

        let options = SyncOptions {
            dry_run: self.dry_run,
            only: self.only.map(Into::into),
        };
        let report = pipeline::run(&people, &notion, &cfg.notion.database_id, &options)
            .context("sync failed")?;
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    for line in report_lines(report, dry_run) {
        println!("{line}");
    }
}

/// Headline counts come from what was applied; changes held back by
/// `--only` are reported on their own line.
fn report_lines(report: &SyncReport, dry_run: bool) -> Vec<String> {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let counts = report.counts();
    let mut lines = Vec::new();

    if report.applied.is_empty() {
        lines.push(format!(
            "{prefix}{} nothing to do ({} contacts up to date)",
            "✓".green(),
            counts.unchanged
        ));
    } else if dry_run {
        lines.push(format!(
            "{prefix}{} would create {}, would update {} ({} unchanged)",
            "✓".green(),
            counts.created,
            counts.updated,
            counts.unchanged,
        ));
    } else {
        lines.push(format!(
            "{} synced: {} created, {} updated, {} unchanged",
            "✓".green(),
            counts.created,
            counts.updated,
            counts.unchanged,
        ));
    }

    for result in &report.applied {
        lines.push(match result {
            ApplyResult::Created { contact, page_id } => {
                format!("  {}  {contact} ({page_id})", "+".green())
            }
            ApplyResult::Updated { contact, page_id } => {
                format!("  {}  {contact} ({page_id})", "✎".yellow())
            }
            ApplyResult::WouldCreate { contact } => format!("  ~  create {contact}"),
            ApplyResult::WouldUpdate { contact, page_id } => {
                format!("  ~  update {contact} ({page_id})")
            }
        });
    }
    if counts.filtered_out > 0 {
        lines.push(format!(
            "  {} {} other changes pending (left out by --only)",
            "·".bright_black(),
            counts.filtered_out
        ));
    }
    if report.plan.skipped > 0 {
        lines.push(format!(
            "  {} {} contacts without a name skipped",
            "·".bright_black(),
            report.plan.skipped
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::ReconcileSummary;
    use rolodex_sync::SyncPlan;

    fn report(applied: Vec<ApplyResult>) -> SyncReport {
        SyncReport {
            plan: SyncPlan {
                fetched: 4,
                skipped: 1,
                destination: 2,
                summary: ReconcileSummary {
                    creates: 1,
                    updates: 1,
                    unchanged: 1,
                },
                changes: Vec::new(),
            },
            applied,
        }
    }

    fn created() -> ApplyResult {
        ApplyResult::Created {
            contact: "Jane Foe".to_string(),
            page_id: "new-1".to_string(),
        }
    }

    #[test]
    fn only_create_reports_the_create_and_the_held_back_update() {
        let lines = report_lines(&report(vec![created()]), false);
        assert!(lines[0].ends_with("synced: 1 created, 0 updated, 1 unchanged"), "{lines:?}");
        assert!(lines[1].contains("Jane Foe (new-1)"));
        assert!(lines.iter().any(|l| l.contains("1 other changes pending")), "{lines:?}");
    }

    #[test]
    fn only_update_with_nothing_to_update_mentions_pending_create() {
        let mut r = report(Vec::new());
        r.plan.summary.updates = 0;
        let lines = report_lines(&r, false);
        assert!(lines[0].contains("nothing to do"), "{lines:?}");
        assert!(lines.iter().any(|l| l.contains("1 other changes pending")), "{lines:?}");
    }

    #[test]
    fn dry_run_never_claims_writes() {
        let applied = vec![
            ApplyResult::WouldCreate {
                contact: "Jane Foe".to_string(),
            },
            ApplyResult::WouldUpdate {
                contact: "John Updated".to_string(),
                page_id: "p2".to_string(),
            },
        ];
        let lines = report_lines(&report(applied), true);
        assert!(lines[0].starts_with("[dry-run] "), "{lines:?}");
        assert!(lines[0].ends_with("would create 1, would update 1 (1 unchanged)"), "{lines:?}");
        assert!(lines.iter().all(|l| !l.contains("synced") && !l.contains("created")));
        assert!(!lines.iter().any(|l| l.contains("other changes pending")));
    }
}
