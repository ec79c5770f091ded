use super::synchronizer::{PROVISIONAL_FOLDER_ICON, SyncError, TreeSynchronizer};
use super::events::{QueueMessagePoster, ShellChange, TreeMessage};
use super::view::{NodeId, PopulationPhase};

use crate::core::config::TreeSettings;
use crate::core::models::{IconDescriptor, ItemAttributes, ItemIdentity};
use crate::shell::namespace::{
    EnumerationFilter, NamespaceError, Result as NamespaceResult, ShellNamespaceOperations,
};

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/*
 * This module contains unit tests for `TreeSynchronizer`. It uses a mock
 * namespace service with scripted children, attributes, icons and failure
 * sets, so expansion, background population, result application and
 * change-notice handling can be exercised without a filesystem. Background
 * tasks run on the real pools; tests pump the posted messages back into the
 * synchronizer explicitly.
 */

// --- MockNamespace ---

#[derive(Debug, Clone)]
struct MockItemData {
    display_name: String,
    parsing_path: Option<PathBuf>,
    attributes: ItemAttributes,
    has_subfolders: bool,
    icon: IconDescriptor,
}

struct MockNamespace {
    items: Mutex<HashMap<ItemIdentity, MockItemData>>,
    children: Mutex<HashMap<ItemIdentity, Vec<ItemIdentity>>>,
    monitored: Mutex<HashSet<ItemIdentity>>,
    fail_enumeration_for: Mutex<HashSet<ItemIdentity>>,
    fail_icon_for: Mutex<HashSet<ItemIdentity>>,
    icon_queries: Mutex<Vec<ItemIdentity>>,
    subfolder_queries: Mutex<Vec<ItemIdentity>>,
}

impl MockNamespace {
    fn new() -> Self {
        MockNamespace {
            items: Mutex::new(HashMap::new()),
            children: Mutex::new(HashMap::new()),
            monitored: Mutex::new(HashSet::new()),
            fail_enumeration_for: Mutex::new(HashSet::new()),
            fail_icon_for: Mutex::new(HashSet::new()),
            icon_queries: Mutex::new(Vec::new()),
            subfolder_queries: Mutex::new(Vec::new()),
        }
    }

    fn default_attributes() -> ItemAttributes {
        ItemAttributes {
            can_copy: true,
            can_move: true,
            can_link: true,
            ..Default::default()
        }
    }

    fn add_folder(&self, identity: &ItemIdentity, parsing_path: Option<&str>) {
        let display_name = identity
            .leaf_name()
            .unwrap_or("Desktop")
            .to_string();
        self.items.lock().unwrap().insert(
            identity.clone(),
            MockItemData {
                display_name,
                parsing_path: parsing_path.map(PathBuf::from),
                attributes: Self::default_attributes(),
                has_subfolders: false,
                icon: IconDescriptor::plain(10),
            },
        );
    }

    fn set_children(&self, parent: &ItemIdentity, children: Vec<ItemIdentity>) {
        if let Some(item) = self.items.lock().unwrap().get_mut(parent) {
            item.has_subfolders = !children.is_empty();
        }
        self.children.lock().unwrap().insert(parent.clone(), children);
    }

    fn set_attributes(&self, identity: &ItemIdentity, attributes: ItemAttributes) {
        if let Some(item) = self.items.lock().unwrap().get_mut(identity) {
            item.attributes = attributes;
        }
    }

    fn set_icon(&self, identity: &ItemIdentity, icon: IconDescriptor) {
        if let Some(item) = self.items.lock().unwrap().get_mut(identity) {
            item.icon = icon;
        }
    }

    fn set_has_subfolders(&self, identity: &ItemIdentity, has_subfolders: bool) {
        if let Some(item) = self.items.lock().unwrap().get_mut(identity) {
            item.has_subfolders = has_subfolders;
        }
    }

    fn fail_enumeration(&self, identity: &ItemIdentity) {
        self.fail_enumeration_for
            .lock()
            .unwrap()
            .insert(identity.clone());
    }

    fn fail_icon(&self, identity: &ItemIdentity) {
        self.fail_icon_for.lock().unwrap().insert(identity.clone());
    }

    fn icon_query_count(&self) -> usize {
        self.icon_queries.lock().unwrap().len()
    }

    fn subfolder_query_count(&self) -> usize {
        self.subfolder_queries.lock().unwrap().len()
    }

    fn is_monitoring(&self, identity: &ItemIdentity) -> bool {
        self.monitored.lock().unwrap().contains(identity)
    }

    fn monitored_count(&self) -> usize {
        self.monitored.lock().unwrap().len()
    }
}

impl ShellNamespaceOperations for MockNamespace {
    fn enumerate_children(
        &self,
        parent: &ItemIdentity,
        filter: EnumerationFilter,
    ) -> NamespaceResult<Vec<ItemIdentity>> {
        if self.fail_enumeration_for.lock().unwrap().contains(parent) {
            return Err(NamespaceError::NotFound(parent.clone()));
        }
        let children = self
            .children
            .lock()
            .unwrap()
            .get(parent)
            .cloned()
            .unwrap_or_default();
        let items = self.items.lock().unwrap();
        Ok(children
            .into_iter()
            .filter(|child| {
                filter.include_hidden
                    || items
                        .get(child)
                        .map(|item| !item.attributes.is_hidden)
                        .unwrap_or(true)
            })
            .collect())
    }

    fn display_name(&self, identity: &ItemIdentity) -> NamespaceResult<String> {
        self.items
            .lock()
            .unwrap()
            .get(identity)
            .map(|item| item.display_name.clone())
            .ok_or_else(|| NamespaceError::NotFound(identity.clone()))
    }

    fn parsing_path(&self, identity: &ItemIdentity) -> Option<PathBuf> {
        self.items
            .lock()
            .unwrap()
            .get(identity)
            .and_then(|item| item.parsing_path.clone())
    }

    fn attributes(&self, identity: &ItemIdentity) -> NamespaceResult<ItemAttributes> {
        self.items
            .lock()
            .unwrap()
            .get(identity)
            .map(|item| item.attributes)
            .ok_or_else(|| NamespaceError::NotFound(identity.clone()))
    }

    fn has_subfolders(&self, identity: &ItemIdentity) -> NamespaceResult<bool> {
        self.subfolder_queries.lock().unwrap().push(identity.clone());
        self.items
            .lock()
            .unwrap()
            .get(identity)
            .map(|item| item.has_subfolders)
            .ok_or_else(|| NamespaceError::NotFound(identity.clone()))
    }

    fn resolve_icon(&self, identity: &ItemIdentity) -> NamespaceResult<IconDescriptor> {
        self.icon_queries.lock().unwrap().push(identity.clone());
        if self.fail_icon_for.lock().unwrap().contains(identity) {
            return Err(NamespaceError::NotFound(identity.clone()));
        }
        self.items
            .lock()
            .unwrap()
            .get(identity)
            .map(|item| item.icon)
            .ok_or_else(|| NamespaceError::NotFound(identity.clone()))
    }

    fn start_change_monitoring(&self, identity: &ItemIdentity) -> NamespaceResult<()> {
        self.monitored.lock().unwrap().insert(identity.clone());
        Ok(())
    }

    fn stop_change_monitoring(&self, identity: &ItemIdentity) -> NamespaceResult<()> {
        self.monitored.lock().unwrap().remove(identity);
        Ok(())
    }
}

// --- Fixture ---

struct Fixture {
    namespace: Arc<MockNamespace>,
    receiver: Receiver<TreeMessage>,
    sync: TreeSynchronizer,
}

impl Fixture {
    fn with_settings(settings: TreeSettings) -> Self {
        let namespace = Arc::new(MockNamespace::new());
        let (sender, receiver) = channel();
        let poster = Arc::new(QueueMessagePoster::new(sender));
        let sync = TreeSynchronizer::new(
            Arc::clone(&namespace) as Arc<dyn ShellNamespaceOperations>,
            poster,
            settings,
        )
        .expect("fixture synchronizer");
        Fixture {
            namespace,
            receiver,
            sync,
        }
    }

    fn new() -> Self {
        Self::with_settings(TreeSettings::default())
    }

    /// Waits for exactly one posted message and feeds it back in.
    fn pump_one(&mut self) -> TreeMessage {
        let message = self
            .receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("expected a posted message");
        self.sync.on_message(message.clone()).expect("message handling");
        message
    }

    fn pump(&mut self, count: usize) {
        for _ in 0..count {
            self.pump_one();
        }
    }

    fn assert_no_message(&self) {
        assert!(
            self.receiver
                .recv_timeout(Duration::from_millis(100))
                .is_err(),
            "expected no posted message"
        );
    }

    /// Registry entries must match visible nodes after any operation.
    fn assert_bijection(&self) {
        assert_eq!(self.sync.registry_len(), self.sync.view().visible_len());
    }

    fn labels_under(&self, node: NodeId) -> Vec<String> {
        self.sync
            .view()
            .children_of(node)
            .iter()
            .filter_map(|child| self.sync.view().node(*child))
            .map(|n| n.label.clone())
            .collect()
    }

    fn child_by_label(&self, parent: NodeId, label: &str) -> NodeId {
        *self
            .sync
            .view()
            .children_of(parent)
            .iter()
            .find(|child| {
                self.sync
                    .view()
                    .node(**child)
                    .map(|n| n.label == label)
                    .unwrap_or(false)
            })
            .unwrap_or_else(|| panic!("no child labelled '{label}'"))
    }
}

fn root() -> ItemIdentity {
    ItemIdentity::root()
}

/*
 * Standard layout used by most tests:
 *   Desktop (virtual root)
 *   ├── documents (/mnt/documents) -> reports, drafts
 *   └── pictures  (/mnt/pictures)
 */
fn standard_tree(namespace: &MockNamespace) {
    let documents = root().child("documents");
    let pictures = root().child("pictures");
    let reports = documents.child("reports");
    let drafts = documents.child("drafts");

    namespace.add_folder(&root(), None);
    namespace.add_folder(&documents, Some("/mnt/documents"));
    namespace.add_folder(&pictures, Some("/mnt/pictures"));
    namespace.add_folder(&reports, Some("/mnt/documents/reports"));
    namespace.add_folder(&drafts, Some("/mnt/documents/drafts"));
    namespace.set_children(&root(), vec![documents.clone(), pictures]);
    namespace.set_children(&documents, vec![reports, drafts]);
}

// --- Expansion and collapse ---

#[test]
fn test_add_root_expands_and_registers_children() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(fixture.sync.view().root(), Some(root_node));
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["documents".to_string(), "pictures".to_string()]
    );
    assert_eq!(fixture.sync.selection(), Some(root_node));
    fixture.assert_bijection();
}

#[test]
fn test_expand_collapse_sequences_keep_registry_in_step() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.expand(documents).unwrap();
    fixture.assert_bijection();
    assert_eq!(fixture.sync.view().visible_len(), 5);

    fixture.sync.collapse(documents).unwrap();
    fixture.assert_bijection();
    assert_eq!(fixture.sync.view().visible_len(), 3);

    fixture.sync.expand(documents).unwrap();
    fixture.sync.collapse(root_node).unwrap();
    fixture.assert_bijection();
    assert_eq!(fixture.sync.view().visible_len(), 1);
}

#[test]
fn test_expand_starts_monitoring_and_collapse_stops_it() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    assert!(fixture.namespace.is_monitoring(&root()));

    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.expand(documents).unwrap();
    assert!(fixture.namespace.is_monitoring(&root().child("documents")));

    fixture.sync.collapse(documents).unwrap();
    assert!(!fixture.namespace.is_monitoring(&root().child("documents")));
    assert!(fixture.namespace.is_monitoring(&root()));
}

#[test]
fn test_collapse_of_ancestor_stops_descendant_monitoring() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.expand(documents).unwrap();
    assert_eq!(fixture.namespace.monitored_count(), 2);

    fixture.sync.collapse(root_node).unwrap();
    assert_eq!(fixture.namespace.monitored_count(), 0);
}

#[test]
fn test_collapse_moves_selection_out_of_subtree() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.expand(documents).unwrap();
    let reports = fixture.child_by_label(documents, "reports");

    fixture.sync.select(Some(reports));
    fixture.sync.collapse(documents).unwrap();
    assert_eq!(fixture.sync.selection(), Some(documents));
}

#[test]
fn test_collapse_keeps_unrelated_selection() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    let pictures = fixture.child_by_label(root_node, "pictures");
    fixture.sync.expand(documents).unwrap();

    fixture.sync.select(Some(pictures));
    fixture.sync.collapse(documents).unwrap();
    assert_eq!(fixture.sync.selection(), Some(pictures));
}

#[test]
fn test_enumeration_failure_leaves_node_unchanged() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);

    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.namespace.fail_enumeration(&root().child("documents"));

    fixture.sync.expand(documents).unwrap();
    assert!(fixture.sync.view().children_of(documents).is_empty());
    assert!(!fixture.sync.view().node(documents).unwrap().expanded);
    fixture.assert_bijection();
}

#[test]
fn test_hidden_items_follow_show_hidden_setting() {
    let mut fixture = Fixture::with_settings(TreeSettings {
        show_hidden: false,
        ..Default::default()
    });
    standard_tree(&fixture.namespace);
    let secret = root().child(".secret");
    fixture.namespace.add_folder(&secret, Some("/mnt/.secret"));
    fixture.namespace.set_attributes(
        &secret,
        ItemAttributes {
            is_hidden: true,
            ..MockNamespace::default_attributes()
        },
    );
    fixture.namespace.set_children(
        &root(),
        vec![root().child("documents"), root().child("pictures"), secret],
    );

    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["documents".to_string(), "pictures".to_string()]
    );

    fixture.sync.set_show_hidden(true);
    fixture.sync.expand(root_node).unwrap();
    assert_eq!(
        fixture.labels_under(root_node),
        vec![
            ".secret".to_string(),
            "documents".to_string(),
            "pictures".to_string()
        ]
    );
    fixture.assert_bijection();
}

#[test]
fn test_system_and_unpinned_items_are_filtered() {
    let mut fixture = Fixture::with_settings(TreeSettings {
        hide_system_items: true,
        pinned_filter: true,
        ..Default::default()
    });
    standard_tree(&fixture.namespace);
    let system = root().child("system32");
    let unpinned = root().child("scratch");
    fixture.namespace.add_folder(&system, Some("/mnt/system32"));
    fixture.namespace.set_attributes(
        &system,
        ItemAttributes {
            is_system: true,
            ..MockNamespace::default_attributes()
        },
    );
    fixture.namespace.add_folder(&unpinned, Some("/mnt/scratch"));
    fixture.namespace.set_attributes(
        &unpinned,
        ItemAttributes {
            pinned_to_tree: false,
            ..MockNamespace::default_attributes()
        },
    );
    fixture.namespace.set_children(
        &root(),
        vec![
            root().child("documents"),
            root().child("pictures"),
            system,
            unpinned,
        ],
    );

    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["documents".to_string(), "pictures".to_string()]
    );
}

#[test]
fn test_enumerated_item_without_display_name_is_skipped() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    // "phantom" appears in the enumeration but the namespace cannot
    // resolve anything about it.
    fixture.namespace.set_children(
        &root(),
        vec![
            root().child("documents"),
            root().child("pictures"),
            root().child("phantom"),
        ],
    );

    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["documents".to_string(), "pictures".to_string()]
    );
    fixture.assert_bijection();
}

// --- Display info and background population ---

#[test]
fn test_display_info_returns_provisional_values_and_queues_tasks() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    let info = fixture.sync.display_info(documents).unwrap();
    assert_eq!(info.icon, PROVISIONAL_FOLDER_ICON);
    assert!(info.has_children);

    {
        let node = fixture.sync.view().node(documents).unwrap();
        assert_eq!(node.icon_phase, PopulationPhase::Pending);
        assert_eq!(node.children_phase, PopulationPhase::Pending);
    }

    fixture.pump(2);
    let node = fixture.sync.view().node(documents).unwrap();
    assert_eq!(node.icon, Some(IconDescriptor::plain(10)));
    assert_eq!(node.icon_phase, PopulationPhase::Populated);
    assert_eq!(node.children_phase, PopulationPhase::Populated);
    // documents has subfolders, so the affordance survives.
    assert!(node.has_children_hint);
}

#[test]
fn test_negative_subfolder_result_clears_affordance() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let pictures = fixture.child_by_label(root_node, "pictures");
    fixture
        .namespace
        .set_has_subfolders(&root().child("pictures"), false);

    fixture.sync.display_info(pictures).unwrap();
    fixture.pump(2);
    let node = fixture.sync.view().node(pictures).unwrap();
    assert!(!node.has_children_hint);
}

#[test]
fn test_display_info_queues_only_once_per_aspect() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.display_info(documents).unwrap();
    fixture.sync.display_info(documents).unwrap();
    fixture.pump(2);
    fixture.assert_no_message();
    assert_eq!(fixture.namespace.icon_query_count(), 1);
    assert_eq!(fixture.namespace.subfolder_query_count(), 1);
}

#[test]
fn test_icon_result_for_removed_item_is_dropped() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.display_info(documents).unwrap();
    // The item vanishes before the results are consumed.
    fixture.sync.collapse(root_node).unwrap();
    fixture.pump(2);

    fixture.assert_bijection();
    assert_eq!(fixture.sync.view().visible_len(), 1);
}

#[test]
fn test_duplicate_completion_message_is_inert() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.display_info(documents).unwrap();
    let first = fixture.pump_one();
    fixture.pump_one();

    // Change what the mock would answer now; replaying the old message must
    // not re-query or alter anything.
    fixture
        .namespace
        .set_icon(&root().child("documents"), IconDescriptor::plain(99));
    fixture.sync.on_message(first).unwrap();

    let node = fixture.sync.view().node(documents).unwrap();
    assert_eq!(node.icon, Some(IconDescriptor::plain(10)));
    assert_eq!(fixture.namespace.icon_query_count(), 1);
}

#[test]
fn test_failed_icon_query_leaves_default_presentation() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.namespace.fail_icon(&root().child("documents"));

    fixture.sync.display_info(documents).unwrap();
    fixture.pump(2);

    let node = fixture.sync.view().node(documents).unwrap();
    assert_eq!(node.icon, None);
    // No retry is queued; a later display request still shows the default.
    let info = fixture.sync.display_info(documents).unwrap();
    assert_eq!(info.icon, PROVISIONAL_FOLDER_ICON);
}

#[test]
fn test_resolved_icon_is_served_from_cache_after_repopulation() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.display_info(documents).unwrap();
    fixture.pump(2);
    assert_eq!(fixture.namespace.icon_query_count(), 1);

    // Collapse and re-expand: a brand-new node for the same path.
    fixture.sync.collapse(root_node).unwrap();
    fixture.sync.expand(root_node).unwrap();
    let documents_again = fixture.child_by_label(root_node, "documents");
    assert_ne!(documents, documents_again);

    let info = fixture.sync.display_info(documents_again).unwrap();
    assert_eq!(info.icon, IconDescriptor::plain(10));
    // Only the subfolder task was queued the second time.
    fixture.pump(1);
    fixture.assert_no_message();
    assert_eq!(fixture.namespace.icon_query_count(), 1);
}

#[test]
fn test_refresh_all_icons_requeries_every_node() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");

    fixture.sync.display_info(documents).unwrap();
    fixture.pump(2);
    fixture
        .namespace
        .set_icon(&root().child("documents"), IconDescriptor::plain(42));

    fixture.sync.refresh_all_icons().unwrap();
    // Root, documents and pictures each get a fresh icon task.
    fixture.pump(3);

    let node = fixture.sync.view().node(documents).unwrap();
    assert_eq!(node.icon, Some(IconDescriptor::plain(42)));
}

// --- Sorting ---

#[test]
fn test_siblings_sort_roots_then_virtual_then_real() {
    let mut fixture = Fixture::new();
    fixture.namespace.add_folder(&root(), None);
    let drive = root().child("drive");
    let gadgets = root().child("gadgets");
    let zeta = root().child("zeta.txt");
    let alpha = root().child("Alpha");

    fixture.namespace.add_folder(&drive, Some("/"));
    fixture.namespace.set_attributes(
        &drive,
        ItemAttributes {
            is_filesystem_root: true,
            ..MockNamespace::default_attributes()
        },
    );
    fixture.namespace.add_folder(&gadgets, None);
    fixture.namespace.add_folder(&zeta, Some("/mnt/zeta.txt"));
    fixture.namespace.add_folder(&alpha, Some("/mnt/Alpha"));
    fixture
        .namespace
        .set_children(&root(), vec![zeta, gadgets, alpha, drive]);

    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(
        fixture.labels_under(root_node),
        vec![
            "drive".to_string(),
            "gadgets".to_string(),
            "Alpha".to_string(),
            "zeta.txt".to_string()
        ]
    );
}

#[test]
fn test_sibling_sort_honors_natural_order_setting() {
    for (use_natural_sort, expected) in [
        (true, vec!["file2".to_string(), "file10".to_string()]),
        (false, vec!["file10".to_string(), "file2".to_string()]),
    ] {
        let mut fixture = Fixture::with_settings(TreeSettings {
            use_natural_sort,
            ..Default::default()
        });
        fixture.namespace.add_folder(&root(), None);
        let ten = root().child("file10");
        let two = root().child("file2");
        fixture.namespace.add_folder(&ten, Some("/mnt/file10"));
        fixture.namespace.add_folder(&two, Some("/mnt/file2"));
        fixture.namespace.set_children(&root(), vec![ten, two]);

        let root_node = fixture.sync.add_root().unwrap();
        assert_eq!(fixture.labels_under(root_node), expected);
    }
}

// --- Locate ---

#[test]
fn test_locate_item_descends_and_expands_on_demand() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let reports = root().child("documents").child("reports");

    // Without creation the branch is not materialized.
    assert_eq!(fixture.sync.locate_item(&reports, false).unwrap(), None);

    let located = fixture.sync.locate_item(&reports, true).unwrap();
    let node = located.expect("reports should be located");
    assert_eq!(fixture.sync.identity_of(node).unwrap(), reports);
    // The documents branch was expanded along the way.
    let documents = fixture.child_by_label(root_node, "documents");
    assert_eq!(fixture.sync.view().children_of(documents).len(), 2);
    fixture.assert_bijection();
}

#[test]
fn test_locate_unknown_identity_returns_none() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    fixture.sync.add_root().unwrap();

    let stranger = root().child("documents").child("stranger");
    assert_eq!(fixture.sync.locate_item(&stranger, true).unwrap(), None);
}

#[test]
fn test_selected_item_identity_follows_selection() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    assert_eq!(fixture.sync.selected_item_identity(), Some(root()));

    let pictures = fixture.child_by_label(root_node, "pictures");
    fixture.sync.select(Some(pictures));
    assert_eq!(
        fixture.sync.selected_item_identity(),
        Some(root().child("pictures"))
    );
}

// --- Change notices ---

#[test]
fn test_created_notice_inserts_sorted_child() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();

    let midway = root().child("midway");
    fixture.namespace.add_folder(&midway, Some("/mnt/midway"));
    fixture
        .sync
        .on_shell_change(ShellChange::Created {
            parent: root(),
            name: "midway".to_string(),
        })
        .unwrap();

    assert_eq!(
        fixture.labels_under(root_node),
        vec![
            "documents".to_string(),
            "midway".to_string(),
            "pictures".to_string()
        ]
    );
    fixture.assert_bijection();

    // A duplicate notice changes nothing.
    fixture
        .sync
        .on_shell_change(ShellChange::Created {
            parent: root(),
            name: "midway".to_string(),
        })
        .unwrap();
    assert_eq!(fixture.sync.view().children_of(root_node).len(), 3);
}

#[test]
fn test_created_notice_for_collapsed_parent_only_restores_affordance() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let pictures = fixture.child_by_label(root_node, "pictures");
    fixture
        .namespace
        .set_has_subfolders(&root().child("pictures"), false);
    fixture.sync.display_info(pictures).unwrap();
    fixture.pump(2);
    assert!(!fixture.sync.view().node(pictures).unwrap().has_children_hint);

    let snapshots = root().child("pictures").child("snapshots");
    fixture.namespace.add_folder(&snapshots, Some("/mnt/pictures/snapshots"));
    fixture
        .sync
        .on_shell_change(ShellChange::Created {
            parent: root().child("pictures"),
            name: "snapshots".to_string(),
        })
        .unwrap();

    let node = fixture.sync.view().node(pictures).unwrap();
    assert!(node.has_children_hint);
    assert!(fixture.sync.view().children_of(pictures).is_empty());
}

#[test]
fn test_removed_notice_purges_subtree_and_adjusts_selection() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.expand(documents).unwrap();
    let reports = fixture.child_by_label(documents, "reports");
    fixture.sync.select(Some(reports));

    fixture
        .sync
        .on_shell_change(ShellChange::Removed {
            identity: root().child("documents"),
        })
        .unwrap();

    assert_eq!(fixture.sync.selection(), Some(root_node));
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["pictures".to_string()]
    );
    assert!(!fixture.namespace.is_monitoring(&root().child("documents")));
    fixture.assert_bijection();
}

#[test]
fn test_removed_notice_for_unmaterialized_item_is_noop() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    fixture.sync.add_root().unwrap();

    fixture
        .sync
        .on_shell_change(ShellChange::Removed {
            identity: root().child("documents").child("reports"),
        })
        .unwrap();
    assert_eq!(fixture.sync.view().visible_len(), 3);
    fixture.assert_bijection();
}

#[test]
fn test_renamed_notice_rebases_identities_and_resorts() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.expand(documents).unwrap();
    let reports = fixture.child_by_label(documents, "reports");

    let old = root().child("documents");
    let new = root().child("work");
    fixture.namespace.add_folder(&new, Some("/mnt/work"));
    fixture
        .sync
        .on_shell_change(ShellChange::Renamed {
            old: old.clone(),
            new: new.clone(),
        })
        .unwrap();

    assert_eq!(fixture.sync.identity_of(documents).unwrap(), new);
    assert_eq!(
        fixture.sync.identity_of(reports).unwrap(),
        new.child("reports")
    );
    assert_eq!(
        fixture.sync.view().node(documents).unwrap().label,
        "work".to_string()
    );
    // Monitoring followed the rename for the expanded node.
    assert!(!fixture.namespace.is_monitoring(&old));
    assert!(fixture.namespace.is_monitoring(&new));
    assert_eq!(
        fixture.labels_under(root_node),
        vec!["pictures".to_string(), "work".to_string()]
    );
}

// --- Shutdown ---

#[test]
fn test_shutdown_rejects_further_expansion() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();

    fixture.sync.shutdown();
    match fixture.sync.expand(root_node) {
        Err(SyncError::ShutDown) => {}
        other => panic!("Expected ShutDown, got {other:?}"),
    }
}

#[test]
fn test_messages_after_shutdown_are_ignored() {
    let mut fixture = Fixture::new();
    standard_tree(&fixture.namespace);
    let root_node = fixture.sync.add_root().unwrap();
    let documents = fixture.child_by_label(root_node, "documents");
    fixture.sync.display_info(documents).unwrap();

    // Wait for both completions, then shut down before consuming them.
    let first = fixture
        .receiver
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    let second = fixture
        .receiver
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    fixture.sync.shutdown();
    fixture.sync.on_message(first).unwrap();
    fixture.sync.on_message(second).unwrap();

    let node = fixture.sync.view().node(documents).unwrap();
    assert_eq!(node.icon, None);
    assert!(node.has_children_hint);
}
