//! Sync configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.rolodex/
//!   config.yaml   (mode 0600)
//!   tokens.json   (mode 0600, see `token_store`)
//! ```
//!
//! Every setting can also come from the environment; a non-empty environment
//! value wins over the file.
//!
//! Functions come in two forms, as elsewhere in this crate: `fn_at(home, …)`
//! takes an explicit home directory (tests always use this form), and `fn(…)`
//! resolves home via `dirs::home_dir()`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::paths::{config_path, home, write_private};

pub const ENV_CLIENT_ID: &str = "GCONTACT_NOTION_SYNC_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GCONTACT_NOTION_SYNC_SECRET";
pub const ENV_REDIRECT_URL: &str = "GCONTACT_NOTION_SYNC_REDIRECT_URL";
pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

const DEFAULT_SUBJECT: &str = "default";

/// Root of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default, skip_serializing_if = "Endpoints::is_default")]
    pub endpoints: Endpoints,
}

/// Destination database credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub database_id: String,
}

/// OAuth client for the address-book API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_url: String,
    /// Key under which the refresh token is kept in the token store.
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            subject: default_subject(),
        }
    }
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

/// Base URLs of the remote APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub people: String,
    pub notion: String,
    pub oauth_authorize: String,
    pub oauth_token: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            people: "https://people.googleapis.com".to_string(),
            notion: "https://api.notion.com".to_string(),
            oauth_authorize: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            oauth_token: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

impl Endpoints {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Config {
    /// Overlay non-empty values from `lookup` (normally `std::env::var`).
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_CLIENT_ID) {
            self.google.client_id = v;
        }
        if let Some(v) = get(ENV_CLIENT_SECRET) {
            self.google.client_secret = v;
        }
        if let Some(v) = get(ENV_REDIRECT_URL) {
            self.google.redirect_url = v;
        }
        if let Some(v) = get(ENV_NOTION_TOKEN) {
            self.notion.token = v;
        }
        if let Some(v) = get(ENV_NOTION_DATABASE_ID) {
            self.notion.database_id = v;
        }
        self
    }

    /// Check every setting a sync run needs.
    pub fn validate(&self) -> Result<(), SyncError> {
        let required = [
            ("notion.token", &self.notion.token),
            ("notion.database_id", &self.notion.database_id),
            ("google.client_id", &self.google.client_id),
            ("google.client_secret", &self.google.client_secret),
            ("google.redirect_url", &self.google.redirect_url),
            ("google.subject", &self.google.subject),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(SyncError::MissingConfig(name)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<home>/.rolodex/config.yaml` as written.
///
/// Returns `SyncError::ConfigNotFound` if absent, `SyncError::ConfigParse`
/// (with path) if malformed.
pub fn load_at(home: &Path) -> Result<Config, SyncError> {
    let path = config_path(home);
    if !path.exists() {
        return Err(SyncError::ConfigNotFound { path });
    }
    let contents =
        std::fs::read_to_string(&path).map_err(|e| crate::error::io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| SyncError::ConfigParse { path, source })
}

/// Save the config atomically with owner-only permissions.
pub fn save_at(home: &Path, config: &Config) -> Result<(), SyncError> {
    let yaml = serde_yaml::to_string(config)?;
    write_private(&config_path(home), &yaml)
}

/// Load the file (if any) and apply overrides from `lookup`, without
/// validating.
///
/// A missing file is not an error here: the environment alone may supply
/// every setting.
pub fn load_with_env_at(
    home: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, SyncError> {
    let base = match load_at(home) {
        Ok(config) => config,
        Err(SyncError::ConfigNotFound { path }) => {
            tracing::debug!("no config at {}; using environment only", path.display());
            Config::default()
        }
        Err(e) => return Err(e),
    };
    Ok(base.with_env_overrides(lookup))
}

/// [`load_with_env_at`], then [`Config::validate`].
pub fn resolve_at(
    home: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, SyncError> {
    let config = load_with_env_at(home, lookup)?;
    config.validate()?;
    Ok(config)
}

/// `resolve_at` convenience wrapper reading the process environment.
pub fn resolve() -> Result<Config, SyncError> {
    resolve_at(&home()?, process_env)
}

/// `load_with_env_at` convenience wrapper reading the process environment.
pub fn load_with_env() -> Result<Config, SyncError> {
    load_with_env_at(&home()?, process_env)
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
