/*
 * The file-action seam: rename, delete, create. The tree engine composes
 * paths and enforces preconditions; the mechanics of the filesystem change
 * live behind `FileActionOperations`. Deletions that should be recoverable
 * go to an app-local trash directory rather than vanishing outright.
 */
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum FileActionError {
    Io(io::Error),
    NoTrashDirectory,
    InvalidTarget(PathBuf),
}

impl From<io::Error> for FileActionError {
    fn from(err: io::Error) -> Self {
        FileActionError::Io(err)
    }
}

impl std::fmt::Display for FileActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileActionError::Io(e) => write!(f, "File action I/O error: {e}"),
            FileActionError::NoTrashDirectory => {
                write!(f, "Could not determine a trash directory")
            }
            FileActionError::InvalidTarget(path) => {
                write!(f, "File action target {path:?} is not valid")
            }
        }
    }
}

impl std::error::Error for FileActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileActionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileActionError>;

pub trait FileActionOperations: Send + Sync {
    fn rename(&self, old_path: &Path, new_path: &Path) -> Result<()>;
    /// `permanent` removes outright; otherwise the item is moved to trash.
    fn delete(&self, path: &Path, permanent: bool) -> Result<()>;
    fn create_directory(&self, path: &Path) -> Result<()>;
}

pub struct CoreFileActionHandler {
    trash_dir: Option<PathBuf>,
}

impl CoreFileActionHandler {
    pub fn new(app_name: &str) -> Self {
        let trash_dir = ProjectDirs::from("", "", app_name)
            .map(|dirs| dirs.data_local_dir().join("trash"));
        CoreFileActionHandler { trash_dir }
    }

    /// Test constructor with an explicit trash location.
    pub fn with_trash_dir(trash_dir: PathBuf) -> Self {
        CoreFileActionHandler {
            trash_dir: Some(trash_dir),
        }
    }

    /*
     * Picks a destination inside the trash directory that does not collide
     * with an earlier deletion of an equally named item.
     */
    fn trash_destination(&self, source: &Path) -> Result<PathBuf> {
        let trash_dir = self
            .trash_dir
            .as_ref()
            .ok_or(FileActionError::NoTrashDirectory)?;
        fs::create_dir_all(trash_dir)?;

        let name = source
            .file_name()
            .ok_or_else(|| FileActionError::InvalidTarget(source.to_path_buf()))?;
        let mut destination = trash_dir.join(name);
        let mut attempt = 1u32;
        while destination.exists() {
            destination = trash_dir.join(format!("{} ({attempt})", name.to_string_lossy()));
            attempt += 1;
        }
        Ok(destination)
    }
}

impl FileActionOperations for CoreFileActionHandler {
    fn rename(&self, old_path: &Path, new_path: &Path) -> Result<()> {
        log::info!("CoreFileActionHandler: Renaming {old_path:?} -> {new_path:?}");
        fs::rename(old_path, new_path)?;
        Ok(())
    }

    fn delete(&self, path: &Path, permanent: bool) -> Result<()> {
        let metadata = fs::symlink_metadata(path)?;
        if permanent {
            log::info!("CoreFileActionHandler: Permanently deleting {path:?}");
            if metadata.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        } else {
            let destination = self.trash_destination(path)?;
            log::info!("CoreFileActionHandler: Moving {path:?} to trash at {destination:?}");
            fs::rename(path, &destination)?;
        }
        Ok(())
    }

    fn create_directory(&self, path: &Path) -> Result<()> {
        log::info!("CoreFileActionHandler: Creating directory {path:?}");
        fs::create_dir(path)?;
        Ok(())
    }
}
