/*
 * The tree synchronizer orchestrates the whole engine: it populates nodes
 * on expansion, hands blocking namespace queries to the background pools,
 * applies their results when the completion messages come back, and tears
 * subtree state down on collapse. All methods here run on the interactive
 * thread; nothing blocks waiting for a background result.
 *
 * Display data is optimistic. A node first shows the provisional folder
 * icon and an assumed expand affordance; the icon result replaces the icon
 * in place, and a negative subfolder result only ever removes the
 * affordance. A result whose item was removed before consumption fails the
 * registry guard and is dropped, which is the engine's entire cancellation
 * story.
 */
use crate::core::comparator;
use crate::core::icon_cache::IconCache;
use crate::core::item_registry::{ItemHandle, ItemRegistry, RegistryError};
use crate::core::models::{IconDescriptor, ItemAttributes, ItemIdentity, SortKey};
use crate::core::result_store::{PendingResult, ResultId, ResultStore};
use crate::core::task_pool::{TaskPool, TaskPoolError};
use crate::core::config::TreeSettings;
use crate::shell::namespace::{EnumerationFilter, NamespaceError, ShellNamespaceOperations};
use crate::tree::events::{MessagePosterOperations, ShellChange, TreeMessage};
use crate::tree::view::{NodeId, PopulationPhase, TreeViewError, TreeViewState};
use std::path::PathBuf;
use std::sync::Arc;

/// Shown until an item's real icon has been resolved.
pub const PROVISIONAL_FOLDER_ICON: IconDescriptor = IconDescriptor {
    index: 3,
    overlay: None,
};

#[derive(Debug)]
pub enum SyncError {
    UnknownNode(NodeId),
    Registry(RegistryError),
    TreeView(TreeViewError),
    Pool(TaskPoolError),
    Namespace(NamespaceError),
    ShutDown,
}

impl From<RegistryError> for SyncError {
    fn from(err: RegistryError) -> Self {
        SyncError::Registry(err)
    }
}

impl From<TreeViewError> for SyncError {
    fn from(err: TreeViewError) -> Self {
        SyncError::TreeView(err)
    }
}

impl From<TaskPoolError> for SyncError {
    fn from(err: TaskPoolError) -> Self {
        SyncError::Pool(err)
    }
}

impl From<NamespaceError> for SyncError {
    fn from(err: NamespaceError) -> Self {
        SyncError::Namespace(err)
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::UnknownNode(node) => write!(f, "Unknown tree node id {}", node.0),
            SyncError::Registry(e) => write!(f, "Registry error: {e}"),
            SyncError::TreeView(e) => write!(f, "Tree view error: {e}"),
            SyncError::Pool(e) => write!(f, "Task pool error: {e}"),
            SyncError::Namespace(e) => write!(f, "Namespace error: {e}"),
            SyncError::ShutDown => write!(f, "Synchronizer is shut down"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Registry(e) => Some(e),
            SyncError::TreeView(e) => Some(e),
            SyncError::Pool(e) => Some(e),
            SyncError::Namespace(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

// What a display-info request returns immediately: provisional values until
// the background results land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub icon: IconDescriptor,
    pub has_children: bool,
}

#[derive(Debug)]
struct IconTaskOutcome {
    node: NodeId,
    handle: ItemHandle,
    icon: IconDescriptor,
}

#[derive(Debug)]
struct SubfoldersTaskOutcome {
    node: NodeId,
    handle: ItemHandle,
    has_subfolder: bool,
}

pub struct TreeSynchronizer {
    tree: TreeViewState,
    registry: ItemRegistry,
    namespace: Arc<dyn ShellNamespaceOperations>,
    poster: Arc<dyn MessagePosterOperations>,
    icon_pool: TaskPool,
    subfolders_pool: TaskPool,
    icon_results: ResultStore<IconTaskOutcome>,
    subfolder_results: ResultStore<SubfoldersTaskOutcome>,
    icon_cache: IconCache,
    settings: TreeSettings,
    shut_down: bool,
}

impl TreeSynchronizer {
    pub fn new(
        namespace: Arc<dyn ShellNamespaceOperations>,
        poster: Arc<dyn MessagePosterOperations>,
        settings: TreeSettings,
    ) -> Result<Self> {
        Ok(TreeSynchronizer {
            tree: TreeViewState::new(),
            registry: ItemRegistry::new(),
            namespace,
            poster,
            icon_pool: TaskPool::new("icon")?,
            subfolders_pool: TaskPool::new("subfolders")?,
            icon_results: ResultStore::new(),
            subfolder_results: ResultStore::new(),
            icon_cache: IconCache::new(),
            settings,
            shut_down: false,
        })
    }

    /*
     * Seeds the tree with the namespace root, selects it and expands it.
     * Any previous tree contents (and their records) are discarded first.
     */
    pub fn add_root(&mut self) -> Result<NodeId> {
        let identity = ItemIdentity::root();
        let label = self.namespace.display_name(&identity)?;

        let old_handles: Vec<ItemHandle> = self
            .tree
            .iter_ids()
            .filter_map(|id| self.tree.node(id).map(|n| n.handle))
            .collect();
        for handle in old_handles {
            self.registry.remove(handle);
        }

        let handle = self.registry.create(identity);
        let node = self.tree.set_root(handle, label);
        self.tree.select(Some(node));
        self.expand(node)?;
        Ok(node)
    }

    /*
     * Answers a display-info request with provisional data and, on the
     * first request per aspect, queues the background queries. A cached
     * icon short-circuits the icon task entirely.
     */
    pub fn display_info(&mut self, node: NodeId) -> Result<DisplayInfo> {
        let (handle, icon, icon_phase, children_phase, has_children) = {
            let n = self.tree.node(node).ok_or(SyncError::UnknownNode(node))?;
            (
                n.handle,
                n.icon,
                n.icon_phase,
                n.children_phase,
                n.has_children_hint,
            )
        };

        let mut effective_icon = icon.unwrap_or(PROVISIONAL_FOLDER_ICON);
        if icon_phase == PopulationPhase::NotPopulated {
            let identity = self.registry.lookup(handle)?.identity.clone();
            let cached = self
                .namespace
                .parsing_path(&identity)
                .and_then(|path| self.icon_cache.find_by_path(&path));
            match cached {
                Some(cached_icon) => {
                    if let Some(n) = self.tree.node_mut(node) {
                        n.icon = Some(cached_icon);
                        n.icon_phase = PopulationPhase::Populated;
                    }
                    effective_icon = cached_icon;
                }
                None => {
                    self.queue_icon_task(node, handle, identity)?;
                    if let Some(n) = self.tree.node_mut(node) {
                        n.icon_phase = PopulationPhase::Pending;
                    }
                }
            }
        }

        if children_phase == PopulationPhase::NotPopulated {
            let identity = self.registry.lookup(handle)?.identity.clone();
            self.queue_subfolders_task(node, handle, identity)?;
            if let Some(n) = self.tree.node_mut(node) {
                n.children_phase = PopulationPhase::Pending;
            }
        }

        Ok(DisplayInfo {
            icon: effective_icon,
            has_children,
        })
    }

    fn queue_icon_task(
        &mut self,
        node: NodeId,
        handle: ItemHandle,
        identity: ItemIdentity,
    ) -> Result<()> {
        let id = self.icon_results.allocate_id();
        let (sender, pending) = PendingResult::channel();
        self.icon_results.register(id, pending);

        let namespace = Arc::clone(&self.namespace);
        let poster = Arc::clone(&self.poster);
        let submitted = self.icon_pool.submit(move || {
            match namespace.resolve_icon(&identity) {
                Ok(icon) => {
                    let _ = sender.send(IconTaskOutcome { node, handle, icon });
                }
                Err(e) => log::debug!("Icon resolution for '{identity}' failed: {e}"),
            }
            poster.post(TreeMessage::IconResultReady(id));
        });
        if let Err(e) = submitted {
            self.icon_results.consume(id);
            return Err(e.into());
        }
        Ok(())
    }

    fn queue_subfolders_task(
        &mut self,
        node: NodeId,
        handle: ItemHandle,
        identity: ItemIdentity,
    ) -> Result<()> {
        let id = self.subfolder_results.allocate_id();
        let (sender, pending) = PendingResult::channel();
        self.subfolder_results.register(id, pending);

        let namespace = Arc::clone(&self.namespace);
        let poster = Arc::clone(&self.poster);
        let submitted = self.subfolders_pool.submit(move || {
            match namespace.has_subfolders(&identity) {
                Ok(has_subfolder) => {
                    let _ = sender.send(SubfoldersTaskOutcome {
                        node,
                        handle,
                        has_subfolder,
                    });
                }
                Err(e) => log::debug!("Subfolder check for '{identity}' failed: {e}"),
            }
            poster.post(TreeMessage::SubfoldersResultReady(id));
        });
        if let Err(e) = submitted {
            self.subfolder_results.consume(id);
            return Err(e.into());
        }
        Ok(())
    }

    /// Routes a dequeued message to its consumer.
    pub fn on_message(&mut self, message: TreeMessage) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        match message {
            TreeMessage::IconResultReady(id) => {
                self.on_icon_result(id);
                Ok(())
            }
            TreeMessage::SubfoldersResultReady(id) => {
                self.on_subfolders_result(id);
                Ok(())
            }
            TreeMessage::ShellChange(change) => self.on_shell_change(change),
        }
    }

    /*
     * Applies one icon result. Consumption removes the store entry whether
     * or not anything else happens, so a duplicated message is inert. A
     * handle that no longer resolves means the item went away while the
     * query ran; the result is dropped without touching the tree.
     */
    pub fn on_icon_result(&mut self, id: ResultId) {
        let Some(outcome) = self.icon_results.consume(id) else {
            return;
        };
        let identity = match self.registry.lookup(outcome.handle) {
            Ok(record) => record.identity.clone(),
            Err(_) => return,
        };
        if let Some(path) = self.namespace.parsing_path(&identity) {
            self.icon_cache.add_or_update(path, outcome.icon);
        }
        if let Some(node) = self.tree.node_mut(outcome.node) {
            node.icon = Some(outcome.icon);
            node.icon_phase = PopulationPhase::Populated;
        }
    }

    /*
     * Applies one subfolder-presence result. Presence is the standing
     * assumption, so a positive result changes nothing; a negative one
     * clears the expand affordance.
     */
    pub fn on_subfolders_result(&mut self, id: ResultId) {
        let Some(outcome) = self.subfolder_results.consume(id) else {
            return;
        };
        if !self.registry.contains(outcome.handle) {
            return;
        }
        if let Some(node) = self.tree.node_mut(outcome.node) {
            if !outcome.has_subfolder {
                node.has_children_hint = false;
            }
            node.children_phase = PopulationPhase::Populated;
        }
    }

    /*
     * Materializes the children of `node`: enumerate through the namespace
     * service (the hidden policy rides on the enumeration flags), filter by
     * the system and pinned policies, insert a record and a visible node
     * per survivor, sort the siblings, and begin monitoring the directory.
     * Enumeration failure leaves the node exactly as it was.
     */
    pub fn expand(&mut self, node: NodeId) -> Result<()> {
        if self.shut_down {
            return Err(SyncError::ShutDown);
        }
        let handle = self
            .tree
            .node(node)
            .ok_or(SyncError::UnknownNode(node))?
            .handle;
        let identity = self.registry.lookup(handle)?.identity.clone();

        let filter = EnumerationFilter {
            include_hidden: self.settings.show_hidden,
        };
        let children = match self.namespace.enumerate_children(&identity, filter) {
            Ok(children) => children,
            Err(e) => {
                log::warn!("TreeSynchronizer: Enumerating '{identity}' failed: {e}");
                return Ok(());
            }
        };

        // A re-expand repopulates from scratch.
        if !self.tree.children_of(node).is_empty() {
            self.purge_descendants(node);
        }

        log::debug!(
            "TreeSynchronizer: Expanding '{identity}' with {} enumerated child(ren).",
            children.len()
        );
        for child in children {
            self.add_item(node, child)?;
        }
        self.sort_children(node)?;
        if let Some(n) = self.tree.node_mut(node) {
            n.expanded = true;
        }
        if let Err(e) = self.namespace.start_change_monitoring(&identity) {
            log::debug!("TreeSynchronizer: Could not start monitoring '{identity}': {e}");
        }
        Ok(())
    }

    /*
     * Inserts one enumerated child, or skips it per the filter policies.
     * Attribute lookup failures skip only the checks that default to
     * hiding; an item the pinned check cannot answer for stays visible.
     */
    fn add_item(&mut self, parent: NodeId, identity: ItemIdentity) -> Result<Option<NodeId>> {
        let display_name = match self.namespace.display_name(&identity) {
            Ok(name) => name,
            Err(e) => {
                log::debug!("TreeSynchronizer: No display name for '{identity}', skipped: {e}");
                return Ok(None);
            }
        };
        let attributes = self.namespace.attributes(&identity).ok();

        if !self.settings.show_hidden {
            if let Some(a) = &attributes {
                if a.is_hidden {
                    return Ok(None);
                }
            }
        }
        if self.settings.pinned_filter {
            if let Some(a) = &attributes {
                if !a.pinned_to_tree {
                    return Ok(None);
                }
            }
        }
        if self.settings.hide_system_items {
            match &attributes {
                Some(a) if !a.is_system => {}
                _ => return Ok(None),
            }
        }

        let handle = self.registry.create(identity);
        let node = self.tree.insert_child(parent, handle, display_name)?;
        Ok(Some(node))
    }

    fn sort_key_for(&self, node: NodeId) -> Result<SortKey> {
        let n = self.tree.node(node).ok_or(SyncError::UnknownNode(node))?;
        let identity = self.registry.lookup(n.handle)?.identity.clone();
        let is_filesystem_root = self
            .namespace
            .attributes(&identity)
            .map(|a| a.is_filesystem_root)
            .unwrap_or(false);
        Ok(SortKey {
            is_filesystem_root,
            parsing_path: self.namespace.parsing_path(&identity),
            display_name: n.label.clone(),
        })
    }

    fn sort_children(&mut self, parent: NodeId) -> Result<()> {
        let children = self.tree.children_of(parent);
        if children.len() < 2 {
            return Ok(());
        }
        let mut keyed = Vec::with_capacity(children.len());
        for child in children {
            keyed.push((child, self.sort_key_for(child)?));
        }
        let use_natural_sort = self.settings.use_natural_sort;
        keyed.sort_by(|a, b| comparator::compare_siblings(&a.1, &b.1, use_natural_sort));
        self.tree
            .set_children_order(parent, keyed.into_iter().map(|(id, _)| id).collect())?;
        Ok(())
    }

    /*
     * Collapses a node: moves a selection that lives inside the collapsing
     * subtree up to the node itself, purges every descendant record, drops
     * the visual subtree, and stops monitoring the directory.
     */
    pub fn collapse(&mut self, node: NodeId) -> Result<()> {
        let handle = self
            .tree
            .node(node)
            .ok_or(SyncError::UnknownNode(node))?
            .handle;
        let identity = self.registry.lookup(handle)?.identity.clone();

        if let Some(selection) = self.tree.selection() {
            if self.tree.is_descendant_of(selection, node) {
                self.tree.select(Some(node));
            }
        }

        self.purge_descendants(node);
        if let Some(n) = self.tree.node_mut(node) {
            n.expanded = false;
        }
        if let Err(e) = self.namespace.stop_change_monitoring(&identity) {
            log::debug!("TreeSynchronizer: Could not stop monitoring '{identity}': {e}");
        }
        Ok(())
    }

    // Removes every descendant node and its record. Monitoring for expanded
    // descendants stops before their records disappear.
    fn purge_descendants(&mut self, node: NodeId) {
        for descendant in self.tree.descendant_ids(node) {
            let Some(n) = self.tree.node(descendant) else {
                continue;
            };
            if !n.expanded {
                continue;
            }
            if let Ok(record) = self.registry.lookup(n.handle) {
                let identity = record.identity.clone();
                if let Err(e) = self.namespace.stop_change_monitoring(&identity) {
                    log::debug!("TreeSynchronizer: Could not stop monitoring '{identity}': {e}");
                }
            }
        }
        for handle in self.tree.remove_descendants(node) {
            self.registry.remove(handle);
        }
    }

    /// Finds the node for an identity without materializing anything new.
    pub fn locate_existing(&mut self, identity: &ItemIdentity) -> Option<NodeId> {
        self.locate_item(identity, false).ok().flatten()
    }

    /*
     * Walks from the root toward `identity`, descending through the branch
     * whose record is an ancestor of the target and advancing across
     * siblings otherwise. With `create_if_missing`, branches without
     * materialized children are expanded on demand along the way.
     */
    pub fn locate_item(
        &mut self,
        identity: &ItemIdentity,
        create_if_missing: bool,
    ) -> Result<Option<NodeId>> {
        let Some(mut current) = self.tree.root() else {
            return Ok(None);
        };
        loop {
            let handle = self
                .tree
                .node(current)
                .ok_or(SyncError::UnknownNode(current))?
                .handle;
            let record_identity = self.registry.lookup(handle)?.identity.clone();

            if record_identity == *identity {
                return Ok(Some(current));
            }
            if record_identity.is_ancestor_of(identity) {
                if self.tree.children_of(current).is_empty() {
                    if !create_if_missing {
                        return Ok(None);
                    }
                    self.expand(current)?;
                }
                match self.tree.children_of(current).first() {
                    Some(first) => current = *first,
                    None => return Ok(None),
                }
            } else {
                match self.tree.next_sibling(current) {
                    Some(sibling) => current = sibling,
                    None => return Ok(None),
                }
            }
        }
    }

    pub fn selected_item_identity(&self) -> Option<ItemIdentity> {
        let selection = self.tree.selection()?;
        let handle = self.tree.node(selection)?.handle;
        self.registry
            .lookup(handle)
            .ok()
            .map(|record| record.identity.clone())
    }

    /// Takes effect on the next expansion; visible children are untouched.
    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        self.settings.show_hidden = show_hidden;
    }

    /*
     * Re-resolves every visible icon asynchronously: drops the cached entry
     * for each item and queues a fresh icon task, so updated icons stream
     * in through the normal result path.
     */
    pub fn refresh_all_icons(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(SyncError::ShutDown);
        }
        let nodes: Vec<(NodeId, ItemHandle)> = self
            .tree
            .iter_ids()
            .filter_map(|id| self.tree.node(id).map(|n| (id, n.handle)))
            .collect();
        for (node, handle) in nodes {
            let identity = match self.registry.lookup(handle) {
                Ok(record) => record.identity.clone(),
                Err(_) => continue,
            };
            if let Some(path) = self.namespace.parsing_path(&identity) {
                self.icon_cache.remove(&path);
            }
            if let Some(n) = self.tree.node_mut(node) {
                n.icon_phase = PopulationPhase::Pending;
            }
            self.queue_icon_task(node, handle, identity)?;
        }
        Ok(())
    }

    /*
     * Applies a directory-change notice from the monitoring facility. Only
     * located, visible items are touched; a notice for a branch that was
     * never materialized is a no-op.
     */
    pub fn on_shell_change(&mut self, change: ShellChange) -> Result<()> {
        match change {
            ShellChange::Created { parent, name } => {
                let Some(parent_node) = self.locate_existing(&parent) else {
                    return Ok(());
                };
                let expanded = self
                    .tree
                    .node(parent_node)
                    .map(|n| n.expanded)
                    .unwrap_or(false);
                if let Some(n) = self.tree.node_mut(parent_node) {
                    n.has_children_hint = true;
                }
                if !expanded {
                    return Ok(());
                }

                let child = parent.child(&name);
                for existing in self.tree.children_of(parent_node) {
                    let Some(n) = self.tree.node(existing) else {
                        continue;
                    };
                    if let Ok(record) = self.registry.lookup(n.handle) {
                        if record.identity == child {
                            return Ok(());
                        }
                    }
                }
                if self.add_item(parent_node, child)?.is_some() {
                    self.sort_children(parent_node)?;
                }
                Ok(())
            }
            ShellChange::Removed { identity } => {
                let Some(node) = self.locate_existing(&identity) else {
                    return Ok(());
                };
                let parent = self.tree.parent_of(node);
                if let Some(selection) = self.tree.selection() {
                    if selection == node || self.tree.is_descendant_of(selection, node) {
                        self.tree.select(parent);
                    }
                }
                self.purge_descendants(node);
                let node_data = self.tree.node(node).map(|n| (n.handle, n.expanded));
                if let Some((handle, expanded)) = node_data {
                    if expanded {
                        if let Ok(record) = self.registry.lookup(handle) {
                            let removed_identity = record.identity.clone();
                            let _ = self.namespace.stop_change_monitoring(&removed_identity);
                        }
                    }
                }
                for handle in self.tree.remove_subtree(node) {
                    self.registry.remove(handle);
                }
                Ok(())
            }
            ShellChange::Renamed { old, new } => {
                let Some(node) = self.locate_existing(&old) else {
                    return Ok(());
                };
                let label = self
                    .namespace
                    .display_name(&new)
                    .unwrap_or_else(|_| new.leaf_name().unwrap_or_default().to_string());

                let mut affected = vec![node];
                affected.extend(self.tree.descendant_ids(node));
                for affected_node in affected {
                    let Some(n) = self.tree.node(affected_node) else {
                        continue;
                    };
                    let (handle, expanded) = (n.handle, n.expanded);
                    let Ok(record) = self.registry.lookup(handle) else {
                        continue;
                    };
                    let previous = record.identity.clone();
                    let rebased = if previous == old {
                        new.clone()
                    } else if old.is_ancestor_of(&previous) {
                        rebased_identity(&previous, &old, &new)
                    } else {
                        continue;
                    };
                    if expanded {
                        let _ = self.namespace.stop_change_monitoring(&previous);
                        let _ = self.namespace.start_change_monitoring(&rebased);
                    }
                    self.registry.update_identity(handle, rebased)?;
                }

                if let Some(n) = self.tree.node_mut(node) {
                    n.label = label;
                }
                if let Some(parent) = self.tree.parent_of(node) {
                    self.sort_children(parent)?;
                }
                Ok(())
            }
        }
    }

    /*
     * Drains both pools (queued work discarded, the in-flight call allowed
     * to finish) and clears the pending result stores. Messages posted by
     * late in-flight work are never dequeued after this returns.
     */
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("TreeSynchronizer: Shutting down; discarding queued background work.");
        self.icon_pool.begin_drain();
        self.subfolders_pool.begin_drain();
        self.icon_pool.shutdown();
        self.subfolders_pool.shutdown();
        self.icon_results.clear();
        self.subfolder_results.clear();
    }

    // --- Accessors used by the interaction handler, the host and tests ---

    pub fn view(&self) -> &TreeViewState {
        &self.tree
    }

    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    pub fn identity_of(&self, node: NodeId) -> Result<ItemIdentity> {
        let handle = self
            .tree
            .node(node)
            .ok_or(SyncError::UnknownNode(node))?
            .handle;
        Ok(self.registry.lookup(handle)?.identity.clone())
    }

    pub fn parsing_path_of(&self, node: NodeId) -> Result<Option<PathBuf>> {
        let identity = self.identity_of(node)?;
        Ok(self.namespace.parsing_path(&identity))
    }

    pub fn attributes_of(&self, node: NodeId) -> Result<ItemAttributes> {
        let identity = self.identity_of(node)?;
        Ok(self.namespace.attributes(&identity)?)
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent_of(node)
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.tree.selection()
    }

    pub fn select(&mut self, node: Option<NodeId>) {
        self.tree.select(node);
    }

    pub fn set_cut_mark(&mut self, node: NodeId, cut: bool) {
        if let Some(n) = self.tree.node_mut(node) {
            n.cut = cut;
        }
    }

    pub fn set_label(&mut self, node: NodeId, label: String) {
        if let Some(n) = self.tree.node_mut(node) {
            n.label = label;
        }
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }
}

impl Drop for TreeSynchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// Replaces the `old` prefix of `identity` with `new`.
fn rebased_identity(
    identity: &ItemIdentity,
    old: &ItemIdentity,
    new: &ItemIdentity,
) -> ItemIdentity {
    let mut result = new.clone();
    for segment in &identity.segments()[old.depth()..] {
        result = result.child(segment);
    }
    result
}
