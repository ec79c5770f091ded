/*
 * Maps small integer handles to item records. A handle is generated from a
 * monotonic counter and is never reused for the lifetime of the process, so a
 * late background result carrying a stale handle can never silently collide
 * with an unrelated item. The registry owns record lifetime exclusively; the
 * visible tree stores the handle as its per-node client data.
 */
use super::models::ItemIdentity;
use std::collections::HashMap;

// An opaque handle for a registered item. Unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub u64);

/*
 * The registered state for one visible item. The identity is immutable
 * except through `update_identity`, which exists solely for rename
 * notifications. Parent linkage is intentionally absent: the visible tree is
 * the only authority on structure.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub handle: ItemHandle,
    pub identity: ItemIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound(ItemHandle),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotFound(handle) => {
                write!(f, "No item record registered for handle {}", handle.0)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Default)]
pub struct ItemRegistry {
    records: HashMap<u64, ItemRecord>,
    next_handle: u64,
}

impl ItemRegistry {
    pub fn new() -> Self {
        ItemRegistry {
            records: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Registers an identity and returns its freshly generated handle.
    pub fn create(&mut self, identity: ItemIdentity) -> ItemHandle {
        let handle = ItemHandle(self.next_handle);
        self.next_handle += 1;
        self.records.insert(
            handle.0,
            ItemRecord {
                handle,
                identity,
            },
        );
        handle
    }

    /*
     * Looks up a record. An unknown handle is reported as `NotFound` rather
     * than treated as a contract violation: background results routinely
     * outlive the item they were queued for, and the caller decides whether
     * a miss means cancellation or a bug.
     */
    pub fn lookup(&self, handle: ItemHandle) -> Result<&ItemRecord> {
        self.records
            .get(&handle.0)
            .ok_or(RegistryError::NotFound(handle))
    }

    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.records.contains_key(&handle.0)
    }

    /// Removes a record. Removing an already-removed handle is a no-op.
    pub fn remove(&mut self, handle: ItemHandle) {
        self.records.remove(&handle.0);
    }

    /// Replaces the identity stored for a handle. Used when a rename
    /// notification arrives for an item that stays visible.
    pub fn update_identity(&mut self, handle: ItemHandle, identity: ItemIdentity) -> Result<()> {
        match self.records.get_mut(&handle.0) {
            Some(record) => {
                record.identity = identity;
                Ok(())
            }
            None => Err(RegistryError::NotFound(handle)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_generates_monotonic_unique_handles() {
        let mut registry = ItemRegistry::new();
        let a = registry.create(ItemIdentity::root());
        let b = registry.create(ItemIdentity::root().child("Documents"));
        assert_ne!(a, b);
        assert!(b.0 > a.0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_handles_are_not_reused_after_removal() {
        let mut registry = ItemRegistry::new();
        let a = registry.create(ItemIdentity::root().child("a"));
        registry.remove(a);
        let b = registry.create(ItemIdentity::root().child("b"));
        assert_ne!(a, b);
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
    }

    #[test]
    fn test_lookup_unknown_handle_is_not_found() {
        let registry = ItemRegistry::new();
        let result = registry.lookup(ItemHandle(42));
        assert_eq!(result, Err(RegistryError::NotFound(ItemHandle(42))));
    }

    #[test]
    fn test_lookup_returns_registered_identity() {
        let mut registry = ItemRegistry::new();
        let identity = ItemIdentity::from_segments(["Documents", "Reports"]);
        let handle = registry.create(identity.clone());

        let record = registry.lookup(handle).unwrap();
        assert_eq!(record.handle, handle);
        assert_eq!(record.identity, identity);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut registry = ItemRegistry::new();
        let handle = registry.create(ItemIdentity::root());
        registry.remove(handle);
        registry.remove(handle);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_identity_rewrites_record() {
        let mut registry = ItemRegistry::new();
        let handle = registry.create(ItemIdentity::from_segments(["old"]));
        let renamed = ItemIdentity::from_segments(["new"]);
        registry.update_identity(handle, renamed.clone()).unwrap();
        assert_eq!(registry.lookup(handle).unwrap().identity, renamed);

        let missing = registry.update_identity(ItemHandle(999), ItemIdentity::root());
        assert!(missing.is_err());
    }
}
