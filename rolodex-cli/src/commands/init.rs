//! `rolodex init [--notion-token ..] [--database-id ..] [--client-id ..] ...`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rolodex_sync::{config, paths, Config, SyncError};

/// Write or update ~/.rolodex/config.yaml.
///
/// Settings not given on the command line keep their current value.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Notion integration token.
    #[arg(long)]
    pub notion_token: Option<String>,

    /// Id of the Notion database that receives contacts.
    #[arg(long)]
    pub database_id: Option<String>,

    /// OAuth client id for the People API.
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth client secret for the People API.
    #[arg(long)]
    pub client_secret: Option<String>,

    /// OAuth redirect URL registered for the client.
    #[arg(long)]
    pub redirect_url: Option<String>,

    /// Key under which the refresh token is stored.
    #[arg(long)]
    pub subject: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let mut cfg = match config::load_at(&home) {
            Ok(existing) => existing,
            Err(SyncError::ConfigNotFound { .. }) => Config::default(),
            Err(e) => return Err(e).context("failed to read existing config"),
        };
        self.apply(&mut cfg);
        config::save_at(&home, &cfg).context("failed to write config")?;

        println!("✓ Saved {}", paths::config_path(&home).display());
        if let Err(missing) = cfg.validate() {
            println!("  Note: {missing}");
        } else {
            println!("  Next: run `rolodex auth url` to authorize contacts access");
        }
        Ok(())
    }

    fn apply(self, cfg: &mut Config) {
        let fields = [
            (self.notion_token, &mut cfg.notion.token),
            (self.database_id, &mut cfg.notion.database_id),
            (self.client_id, &mut cfg.google.client_id),
            (self.client_secret, &mut cfg.google.client_secret),
            (self.redirect_url, &mut cfg.google.redirect_url),
            (self.subject, &mut cfg.google.subject),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
