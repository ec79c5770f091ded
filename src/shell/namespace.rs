/*
 * The shell-namespace seam. `ShellNamespaceOperations` is everything the
 * tree engine asks of the namespace: child enumeration, display names,
 * parsing paths, attributes, the (blocking) subfolder and icon queries the
 * background pools run, and directory-change monitoring control.
 *
 * `FileSystemNamespace` is the concrete implementation used outside of
 * tests: a mounted directory interpreted as the namespace, enumerated with
 * the `ignore` walker limited to immediate children. Icon indices are
 * derived deterministically from the item kind; real icon extraction
 * belongs to a platform adapter behind this same trait.
 */
use crate::core::models::{IconDescriptor, ItemAttributes, ItemIdentity};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

// Deterministic icon indices for the filesystem-backed namespace.
pub const ICON_NAMESPACE_ROOT: u32 = 2;
pub const ICON_FOLDER: u32 = 3;
pub const ICON_FOLDER_HIDDEN: u32 = 4;
pub const OVERLAY_LINK: u32 = 1;

#[derive(Debug)]
pub enum NamespaceError {
    Io(io::Error),
    Walk(ignore::Error),
    NotFound(ItemIdentity),
}

impl From<io::Error> for NamespaceError {
    fn from(err: io::Error) -> Self {
        NamespaceError::Io(err)
    }
}

impl From<ignore::Error> for NamespaceError {
    fn from(err: ignore::Error) -> Self {
        NamespaceError::Walk(err)
    }
}

impl std::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespaceError::Io(e) => write!(f, "Namespace I/O error: {e}"),
            NamespaceError::Walk(e) => write!(f, "Namespace enumeration error: {e}"),
            NamespaceError::NotFound(identity) => {
                write!(f, "No namespace item at '{identity}'")
            }
        }
    }
}

impl std::error::Error for NamespaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NamespaceError::Io(e) => Some(e),
            NamespaceError::Walk(e) => Some(e),
            NamespaceError::NotFound(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NamespaceError>;

// Flags passed to child enumeration, mirroring how the enumeration itself
// (not the caller) applies the hidden-item policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerationFilter {
    pub include_hidden: bool,
}

pub trait ShellNamespaceOperations: Send + Sync {
    /// Enumerates the immediate folder children of `parent`, unordered.
    fn enumerate_children(
        &self,
        parent: &ItemIdentity,
        filter: EnumerationFilter,
    ) -> Result<Vec<ItemIdentity>>;

    fn display_name(&self, identity: &ItemIdentity) -> Result<String>;

    /// The item's filesystem path, or `None` for virtual-only items.
    fn parsing_path(&self, identity: &ItemIdentity) -> Option<PathBuf>;

    fn attributes(&self, identity: &ItemIdentity) -> Result<ItemAttributes>;

    /// Blocking: answers whether the item has at least one subfolder.
    /// Runs on the subfolder pool, never on the interactive thread.
    fn has_subfolders(&self, identity: &ItemIdentity) -> Result<bool>;

    /// Blocking: resolves the item's icon. Runs on the icon pool.
    fn resolve_icon(&self, identity: &ItemIdentity) -> Result<IconDescriptor>;

    fn start_change_monitoring(&self, identity: &ItemIdentity) -> Result<()>;
    fn stop_change_monitoring(&self, identity: &ItemIdentity) -> Result<()>;
}

pub struct FileSystemNamespace {
    mount: PathBuf,
    root_display: String,
    monitored: Mutex<HashSet<ItemIdentity>>,
}

impl FileSystemNamespace {
    pub fn new(mount: PathBuf) -> Result<Self> {
        let metadata = std::fs::metadata(&mount)?;
        if !metadata.is_dir() {
            return Err(NamespaceError::Io(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("Mount point {mount:?} is not a directory"),
            )));
        }
        let root_display = mount
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| mount.to_string_lossy().into_owned());
        Ok(FileSystemNamespace {
            mount,
            root_display,
            monitored: Mutex::new(HashSet::new()),
        })
    }

    fn path_of(&self, identity: &ItemIdentity) -> PathBuf {
        let mut path = self.mount.clone();
        for segment in identity.segments() {
            path.push(segment);
        }
        path
    }

    fn is_hidden_name(name: &str) -> bool {
        name.starts_with('.')
    }

    /// Monitoring bookkeeping is observable for tests and diagnostics.
    pub fn is_monitoring(&self, identity: &ItemIdentity) -> bool {
        self.monitored
            .lock()
            .map(|set| set.contains(identity))
            .unwrap_or(false)
    }

    pub fn monitored_count(&self) -> usize {
        self.monitored.lock().map(|set| set.len()).unwrap_or(0)
    }
}

impl ShellNamespaceOperations for FileSystemNamespace {
    /*
     * Walks the parent directory one level deep with the `ignore` walker.
     * Only folders enter the tree. Entries that fail to resolve are skipped
     * and logged; a missing or unreadable parent is the error case.
     */
    fn enumerate_children(
        &self,
        parent: &ItemIdentity,
        filter: EnumerationFilter,
    ) -> Result<Vec<ItemIdentity>> {
        let parent_path = self.path_of(parent);
        if !parent_path.exists() {
            return Err(NamespaceError::NotFound(parent.clone()));
        }

        let walker = WalkBuilder::new(&parent_path)
            .standard_filters(false)
            .hidden(!filter.include_hidden)
            .max_depth(Some(1))
            .build();

        let mut children = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("FileSystemNamespace: Skipping unreadable entry under '{parent}': {e}");
                    continue;
                }
            };
            // Depth 0 is the parent itself.
            if entry.depth() == 0 {
                continue;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => children.push(parent.child(name)),
                None => {
                    log::debug!(
                        "FileSystemNamespace: Skipping non-UTF-8 name under '{parent}': {:?}",
                        entry.file_name()
                    );
                }
            }
        }
        Ok(children)
    }

    fn display_name(&self, identity: &ItemIdentity) -> Result<String> {
        match identity.leaf_name() {
            Some(name) => Ok(name.to_string()),
            None => Ok(self.root_display.clone()),
        }
    }

    fn parsing_path(&self, identity: &ItemIdentity) -> Option<PathBuf> {
        Some(self.path_of(identity))
    }

    fn attributes(&self, identity: &ItemIdentity) -> Result<ItemAttributes> {
        let path = self.path_of(identity);
        // symlink_metadata so a dangling link still has attributes.
        let _metadata = std::fs::symlink_metadata(&path)?;
        let is_hidden = identity
            .leaf_name()
            .map(Self::is_hidden_name)
            .unwrap_or(false);
        Ok(ItemAttributes {
            is_hidden,
            is_system: false,
            is_filesystem_root: path.parent().is_none(),
            pinned_to_tree: true,
            can_copy: true,
            can_move: true,
            can_link: true,
        })
    }

    fn has_subfolders(&self, identity: &ItemIdentity) -> Result<bool> {
        let path = self.path_of(identity);
        for entry in std::fs::read_dir(&path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_icon(&self, identity: &ItemIdentity) -> Result<IconDescriptor> {
        let path = self.path_of(identity);
        let metadata = std::fs::symlink_metadata(&path)?;

        if identity.is_namespace_root() {
            return Ok(IconDescriptor::plain(ICON_NAMESPACE_ROOT));
        }
        let hidden = identity
            .leaf_name()
            .map(Self::is_hidden_name)
            .unwrap_or(false);
        let index = if hidden { ICON_FOLDER_HIDDEN } else { ICON_FOLDER };
        let overlay = if metadata.file_type().is_symlink() {
            Some(OVERLAY_LINK)
        } else {
            None
        };
        Ok(IconDescriptor { index, overlay })
    }

    fn start_change_monitoring(&self, identity: &ItemIdentity) -> Result<()> {
        if let Ok(mut set) = self.monitored.lock() {
            if set.insert(identity.clone()) {
                log::debug!("FileSystemNamespace: Monitoring '{identity}'");
            }
        }
        Ok(())
    }

    fn stop_change_monitoring(&self, identity: &ItemIdentity) -> Result<()> {
        if let Ok(mut set) = self.monitored.lock() {
            if set.remove(identity) {
                log::debug!("FileSystemNamespace: Stopped monitoring '{identity}'");
            }
        }
        Ok(())
    }
}
