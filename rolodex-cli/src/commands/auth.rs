//! `rolodex auth url|exchange`: obtain and store a refresh token.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use rolodex_sync::{config, oauth, paths, token_store, Config};

/// Subcommands for `rolodex auth`.
#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Print the consent URL to open in a browser.
    Url,

    /// Trade the code from the redirect for a refresh token and store it.
    Exchange {
        /// The `code` query parameter from the redirect URL.
        code: String,
    },
}

pub fn run(command: AuthCommand) -> Result<()> {
    let cfg = config::load_with_env().context("failed to load config")?;
    match command {
        AuthCommand::Url => {
            require(&cfg, false)?;
            println!("{}", oauth::authorization_url(&cfg));
            Ok(())
        }
        AuthCommand::Exchange { code } => {
            require(&cfg, true)?;
            let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
            let tokens = oauth::OAuthClient::new(&cfg)
                .exchange_code(code.trim())
                .context("authorization code exchange failed")?;
            let refresh_token = tokens
                .refresh_token
                .context("token response has no refresh_token")?;
            let subject = &cfg.google.subject;
            token_store::store_token_at(&home, subject, &refresh_token)
                .context("failed to store refresh token")?;

            println!("✓ Stored refresh token for '{subject}'");
            println!("  Saved to: {}", paths::tokens_path(&home).display());
            Ok(())
        }
    }
}

/// OAuth settings only; the Notion ones are not needed to authorize.
fn require(cfg: &Config, with_secret: bool) -> Result<()> {
    let mut settings = vec![
        ("google.client_id", &cfg.google.client_id),
        ("google.redirect_url", &cfg.google.redirect_url),
    ];
    if with_secret {
        settings.push(("google.client_secret", &cfg.google.client_secret));
    }
    if let Some((name, _)) = settings.iter().find(|(_, v)| v.trim().is_empty()) {
        bail!("missing required setting `{name}`; run `rolodex init` or set it in the environment");
    }
    Ok(())
}
