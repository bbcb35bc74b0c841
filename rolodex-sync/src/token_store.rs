//! Refresh-token store.
//!
//! Persists a `TokenStoreFile` JSON document at `<home>/.rolodex/tokens.json`,
//! keyed by subject (the account the token was issued for). Writes use the
//! same atomic `.tmp` + rename pattern as the config file.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};
use crate::paths::{tokens_path, write_private};

/// A stored refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

/// On-disk token store payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStoreFile {
    #[serde(default)]
    pub tokens: BTreeMap<String, StoredToken>,
}

/// Load the token store. Returns an empty store if the file does not exist.
pub fn load_at(home: &Path) -> Result<TokenStoreFile, SyncError> {
    let path = tokens_path(home);
    if !path.exists() {
        return Ok(TokenStoreFile::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the token store atomically.
pub fn save_at(home: &Path, store: &TokenStoreFile) -> Result<(), SyncError> {
    let json = serde_json::to_string_pretty(store)?;
    write_private(&tokens_path(home), &json)
}

/// Insert or replace the refresh token for `subject`.
pub fn store_token_at(home: &Path, subject: &str, refresh_token: &str) -> Result<(), SyncError> {
    let mut store = load_at(home)?;
    store.tokens.insert(
        subject.to_owned(),
        StoredToken {
            refresh_token: refresh_token.to_owned(),
            updated_at: Utc::now(),
        },
    );
    save_at(home, &store)?;
    tracing::info!("saved refresh token for '{subject}'");
    Ok(())
}

/// Refresh token for `subject`, if one was stored.
pub fn get_token_at(home: &Path, subject: &str) -> Result<Option<String>, SyncError> {
    let store = load_at(home)?;
    Ok(store.tokens.get(subject).map(|t| t.refresh_token.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_has_no_tokens() {
        let tmp = TempDir::new().unwrap();
        assert!(load_at(tmp.path()).unwrap().tokens.is_empty());
        assert_eq!(get_token_at(tmp.path(), "default").unwrap(), None);
    }

    #[test]
    fn store_then_get() {
        let tmp = TempDir::new().unwrap();
        store_token_at(tmp.path(), "default", "1//refresh-a").unwrap();
        assert_eq!(
            get_token_at(tmp.path(), "default").unwrap().as_deref(),
            Some("1//refresh-a")
        );
        assert_eq!(get_token_at(tmp.path(), "other").unwrap(), None);
    }

    #[test]
    fn storing_again_replaces_existing_token() {
        let tmp = TempDir::new().unwrap();
        store_token_at(tmp.path(), "default", "old").unwrap();
        store_token_at(tmp.path(), "work", "work-token").unwrap();
        store_token_at(tmp.path(), "default", "new").unwrap();

        let store = load_at(tmp.path()).unwrap();
        assert_eq!(store.tokens.len(), 2);
        assert_eq!(store.tokens["default"].refresh_token, "new");
        assert_eq!(store.tokens["work"].refresh_token, "work-token");
    }

    #[test]
    fn corrupt_store_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tokens_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_at(tmp.path()), Err(SyncError::Json(_))));
    }
}
