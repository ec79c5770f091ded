/*
 * Process-wide cache of resolved icons, keyed by an item's parsing path.
 * Populated when an asynchronous icon result is applied; consulted before
 * queueing a new icon task so previously seen items render correctly on
 * their first display request.
 */
use super::models::IconDescriptor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct IconCache {
    icons: HashMap<PathBuf, IconDescriptor>,
}

impl IconCache {
    pub fn new() -> Self {
        IconCache {
            icons: HashMap::new(),
        }
    }

    pub fn find_by_path(&self, path: &Path) -> Option<IconDescriptor> {
        self.icons.get(path).copied()
    }

    pub fn add_or_update(&mut self, path: PathBuf, icon: IconDescriptor) {
        self.icons.insert(path, icon);
    }

    pub fn remove(&mut self, path: &Path) {
        self.icons.remove(path);
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
