use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

pub const CONFIG_FILE: &str = "config.yaml";
pub const TOKENS_FILE: &str = "tokens.json";

pub fn rolodex_root(home: &Path) -> PathBuf {
    home.join(".rolodex")
}

pub fn config_path(home: &Path) -> PathBuf {
    rolodex_root(home).join(CONFIG_FILE)
}

pub fn tokens_path(home: &Path) -> PathBuf {
    rolodex_root(home).join(TOKENS_FILE)
}

pub fn home() -> Result<PathBuf, SyncError> {
    dirs::home_dir().ok_or(SyncError::HomeNotFound)
}

/// Atomically replace `path` with `contents`: write `<path>.tmp` (mode `0600`),
/// then rename over the target. The parent directory is created (mode `0700`)
/// if missing.
pub(crate) fn write_private(path: &Path, contents: &str) -> Result<(), SyncError> {
    use crate::error::io_err;

    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("path has no parent")));
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        set_permissions(dir, 0o700)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    // A leftover tmp file keeps its old mode when reopened.
    if tmp.exists() {
        std::fs::remove_file(&tmp).map_err(|e| io_err(&tmp, e))?;
    }
    let mut file = open_private(&tmp).map_err(|e| io_err(&tmp, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| io_err(&tmp, e))?;
    drop(file);
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Create `path` with mode `0600` so the contents are never readable by
/// other users, even before the rename.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<(), SyncError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| crate::error::io_err(path, e))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<(), SyncError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_live_under_dot_rolodex() {
        let home = Path::new("/home/jane");
        assert_eq!(config_path(home), PathBuf::from("/home/jane/.rolodex/config.yaml"));
        assert_eq!(tokens_path(home), PathBuf::from("/home/jane/.rolodex/tokens.json"));
    }

    #[test]
    fn write_private_replaces_file_and_removes_tmp() {
        let home = TempDir::new().unwrap();
        let path = config_path(home.path());
        write_private(&path, "first").unwrap();
        write_private(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_file_name("config.yaml.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_private_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let home = TempDir::new().unwrap();
        let path = tokens_path(home.path());
        write_private(&path, "{}").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn stale_world_readable_tmp_is_not_reused() {
        use std::os::unix::fs::PermissionsExt;

        let home = TempDir::new().unwrap();
        let path = tokens_path(home.path());
        let tmp = path.with_file_name("tokens.json.tmp");
        std::fs::create_dir_all(tmp.parent().unwrap()).unwrap();
        std::fs::write(&tmp, "stale").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, "{\"tokens\":{}}").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"tokens\":{}}");
        assert!(!tmp.exists());
    }
}
