/*
 * This module consolidates the leaf components of the tree engine: shared
 * value types, the item registry, the background task pool and result
 * store, the sibling comparator, the icon cache, and the persisted
 * settings (with its `SettingsStoreOperations` abstraction).
 */
pub mod comparator;
pub mod config;
pub mod icon_cache;
pub mod item_registry;
pub mod models;
pub mod result_store;
pub mod task_pool;

// Re-export key structures and enums
pub use models::{DropEffects, IconDescriptor, ItemAttributes, ItemIdentity, SortKey};

pub use item_registry::{ItemHandle, ItemRecord, ItemRegistry, RegistryError};

pub use result_store::{PendingResult, ResultId, ResultStore};

pub use task_pool::{TaskPool, TaskPoolError};

pub use icon_cache::IconCache;

pub use config::{ConfigError, CoreSettingsStore, SettingsStoreOperations, TreeSettings};
