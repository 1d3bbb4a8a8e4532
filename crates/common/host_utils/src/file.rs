use log::debug;
use nix::unistd::chown;
use nix::unistd::Gid;
use nix::unistd::Uid;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use uzers::get_group_by_name;
use uzers::get_user_by_name;

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("Creating the file failed: {file:?}.")]
    FileCreateFailed { file: String, from: std::io::Error },

    #[error("Writing the file failed: {file:?}.")]
    FileWriteFailed { file: String, from: std::io::Error },

    #[error("Failed to change permissions: {name:?}.")]
    MetaDataError { name: String, from: std::io::Error },

    #[error("User not found: {user:?}.")]
    UserNotFound { user: String },

    #[error("Group not found: {group:?}.")]
    GroupNotFound { group: String },

    #[error(transparent)]
    Errno(#[from] nix::errno::Errno),

    #[error("The path is not accessible. {path:?}")]
    PathNotAccessible { path: PathBuf },
}

impl FileError {
    /// True when the failure is about resolving a user or a group name, and not about the file itself.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            FileError::UserNotFound { .. } | FileError::GroupNotFound { .. }
        )
    }
}

#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FilePermissions {
    pub user: Option<String>,
    pub group: Option<String>,
    pub mode: Option<u32>,
}

impl FilePermissions {
    pub fn new(user: Option<String>, group: Option<String>, mode: Option<u32>) -> Self {
        Self { user, group, mode }
    }

    pub fn change_permissions(&self, file: &Path) -> Result<(), FileError> {
        if let Some(user) = &self.user {
            change_user(file, user)?;
        }
        if let Some(group) = &self.group {
            change_group(file, group)?;
        }
        if let Some(mode) = &self.mode {
            change_mode(file, *mode)?;
        }
        Ok(())
    }
}

/// Save `contents` into the file at `path`, with the given ownership and mode.
///
/// The file is created if missing, and the ownership and mode are applied
/// before any content is written, so the content is never exposed with looser permissions.
/// Any previous content is replaced.
pub fn save_file(
    contents: &[u8],
    path: impl AsRef<Path>,
    permissions: &FilePermissions,
) -> Result<(), FileError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|from| FileError::FileCreateFailed {
            file: path.display().to_string(),
            from,
        })?;

    permissions.change_permissions(path)?;

    let write_failed = |from| FileError::FileWriteFailed {
        file: path.display().to_string(),
        from,
    };
    file.set_len(0).map_err(write_failed)?;
    file.write_all(contents).map_err(write_failed)?;
    file.sync_all().map_err(write_failed)?;

    debug!("Saved {} bytes to {}", contents.len(), path.display());
    Ok(())
}

fn change_user(file: &Path, user: &str) -> Result<(), FileError> {
    let ud = match get_user_by_name(user) {
        Some(user) => user.uid(),
        None => {
            return Err(FileError::UserNotFound { user: user.into() });
        }
    };

    let uid = get_metadata(file)?.uid();

    // if user is same as existing, then do not change
    if ud != uid {
        chown(file, Some(Uid::from_raw(ud)), None)?;
    }

    Ok(())
}

fn change_group(file: &Path, group: &str) -> Result<(), FileError> {
    let gd = match get_group_by_name(group) {
        Some(group) => group.gid(),
        None => {
            return Err(FileError::GroupNotFound {
                group: group.into(),
            });
        }
    };

    let gid = get_metadata(file)?.gid();

    // if group is same as existing, then do not change
    if gd != gid {
        chown(file, None, Some(Gid::from_raw(gd)))?;
    }

    Ok(())
}

fn change_mode(file: &Path, mode: u32) -> Result<(), FileError> {
    let mut perm = get_metadata(file)?.permissions();
    perm.set_mode(mode);

    fs::set_permissions(file, perm).map_err(|e| FileError::MetaDataError {
        name: file.display().to_string(),
        from: e,
    })?;

    Ok(())
}

/// Return metadata when the given path exists and accessible by user
pub fn get_metadata(path: &Path) -> Result<fs::Metadata, FileError> {
    fs::metadata(path).map_err(|_| FileError::PathNotAccessible {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn save_file_with_mode() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("slurm.conf");

        let permissions = FilePermissions::new(None, None, Some(0o600));
        save_file(b"ClusterName=test\n", &file_path, &permissions)?;

        assert_eq!(fs::read_to_string(&file_path)?, "ClusterName=test\n");
        let mode = fs::metadata(&file_path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn save_file_with_current_user_and_group() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("file");

        let user = whoami::username();
        let permissions = FilePermissions::new(Some(user.clone()), Some(user), Some(0o644));
        save_file(b"content", &file_path, &permissions)?;

        let mode = fs::metadata(&file_path)?.permissions().mode();
        assert!(format!("{:o}", mode).contains("644"));
        Ok(())
    }

    #[test]
    fn save_file_replaces_previous_content() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("file");
        fs::write(&file_path, "a much longer previous content")?;

        save_file(b"short", &file_path, &FilePermissions::default())?;

        assert_eq!(fs::read_to_string(&file_path)?, "short");
        Ok(())
    }

    #[test]
    fn unknown_user_is_a_lookup_failure() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("file");

        let permissions = FilePermissions::new(Some("no-such-user-xyz".into()), None, None);
        let err = save_file(b"secret", &file_path, &permissions).unwrap_err();

        assert!(err.is_lookup_failure());
        assert!(err.to_string().contains("User not found"));
        // nothing has been written
        assert_eq!(fs::read_to_string(&file_path)?, "");
        Ok(())
    }

    #[test]
    fn unknown_group_is_a_lookup_failure() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("file");

        let permissions = FilePermissions::new(None, Some("no-such-group-xyz".into()), None);
        let err = save_file(b"secret", &file_path, &permissions).unwrap_err();

        assert_matches!(err, FileError::GroupNotFound { .. });
        assert!(err.is_lookup_failure());
        Ok(())
    }

    #[test]
    fn missing_parent_directory_is_not_a_lookup_failure() {
        let err = save_file(
            b"content",
            "/non/existent/dir/file",
            &FilePermissions::default(),
        )
        .unwrap_err();

        assert_matches!(err, FileError::FileCreateFailed { .. });
        assert!(!err.is_lookup_failure());
    }
}
