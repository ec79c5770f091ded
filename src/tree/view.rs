/*
 * The visible tree: an owned model of exactly the state the host's tree
 * control renders (labels, icons, expand affordances, cut marks, selection,
 * expansion). Tree position here is the single authority on parent/child
 * relationships; item records never store parents. Each node carries one
 * live `ItemHandle` as its client data.
 *
 * Node ids are generated monotonically and never reused, so a stale id held
 * across a removal can never alias a newer node.
 */
use crate::core::item_registry::ItemHandle;
use crate::core::models::IconDescriptor;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

// Per-aspect population progress for a node's display data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationPhase {
    NotPopulated,
    Pending,
    Populated,
}

#[derive(Debug)]
pub struct TreeNode {
    pub handle: ItemHandle,
    pub label: String,
    /// Resolved icon; `None` renders as the provisional default.
    pub icon: Option<IconDescriptor>,
    pub icon_phase: PopulationPhase,
    pub children_phase: PopulationPhase,
    /// Optimistic expand affordance; only ever corrected downward.
    pub has_children_hint: bool,
    pub expanded: bool,
    pub cut: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(handle: ItemHandle, label: String, parent: Option<NodeId>) -> Self {
        TreeNode {
            handle,
            label,
            icon: None,
            icon_phase: PopulationPhase::NotPopulated,
            children_phase: PopulationPhase::NotPopulated,
            has_children_hint: true,
            expanded: false,
            cut: false,
            parent,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViewError {
    UnknownNode(NodeId),
}

impl std::fmt::Display for TreeViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeViewError::UnknownNode(node) => write!(f, "Unknown tree node id {}", node.0),
        }
    }
}

impl std::error::Error for TreeViewError {}

pub type Result<T> = std::result::Result<T, TreeViewError>;

#[derive(Debug, Default)]
pub struct TreeViewState {
    nodes: HashMap<u64, TreeNode>,
    root: Option<NodeId>,
    selection: Option<NodeId>,
    next_node_id: u64,
}

impl TreeViewState {
    pub fn new() -> Self {
        TreeViewState {
            nodes: HashMap::new(),
            root: None,
            selection: None,
            next_node_id: 0,
        }
    }

    fn generate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Replaces the entire tree with a fresh root node.
    pub fn set_root(&mut self, handle: ItemHandle, label: String) -> NodeId {
        self.nodes.clear();
        self.selection = None;
        let id = self.generate_node_id();
        self.nodes.insert(id.0, TreeNode::new(handle, label, None));
        self.root = Some(id);
        id
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        handle: ItemHandle,
        label: String,
    ) -> Result<NodeId> {
        if !self.nodes.contains_key(&parent.0) {
            return Err(TreeViewError::UnknownNode(parent));
        }
        let id = self.generate_node_id();
        self.nodes
            .insert(id.0, TreeNode::new(handle, label, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(&parent.0) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id.0)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id.0).and_then(|node| node.parent)
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id.0)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = &self.nodes.get(&parent.0)?.children;
        let position = siblings.iter().position(|s| *s == id)?;
        siblings.get(position + 1).copied()
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn select(&mut self, id: Option<NodeId>) {
        match id {
            Some(node) if !self.nodes.contains_key(&node.0) => {
                log::warn!("TreeViewState: Ignoring selection of unknown node {}", node.0);
            }
            _ => self.selection = id,
        }
    }

    /// True when `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_of(node);
        }
        false
    }

    /// All nodes strictly below `id`, depth-first.
    pub fn descendant_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = self.children_of(id);
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children_of(node));
        }
        result
    }

    /*
     * Detaches and drops every node strictly below `id`, returning the
     * handles that were attached to them. A selection inside the removed
     * subtree is cleared; callers that need an ancestor-safe replacement
     * selection adjust it before purging.
     */
    pub fn remove_descendants(&mut self, id: NodeId) -> Vec<ItemHandle> {
        let descendants = self.descendant_ids(id);
        let mut handles = Vec::with_capacity(descendants.len());
        for node in &descendants {
            if let Some(removed) = self.nodes.remove(&node.0) {
                handles.push(removed.handle);
            }
            if self.selection == Some(*node) {
                self.selection = None;
            }
        }
        if let Some(parent_node) = self.nodes.get_mut(&id.0) {
            parent_node.children.clear();
        }
        handles
    }

    /// Removes `id` and its whole subtree, returning the attached handles.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<ItemHandle> {
        let mut handles = self.remove_descendants(id);
        if let Some(parent) = self.parent_of(id) {
            if let Some(parent_node) = self.nodes.get_mut(&parent.0) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        if let Some(removed) = self.nodes.remove(&id.0) {
            handles.push(removed.handle);
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        handles
    }

    /*
     * Replaces the child order of `parent`. The new order must be a
     * permutation of the current children; anything else is a programming
     * error reported as `UnknownNode` for the first offender.
     */
    pub fn set_children_order(&mut self, parent: NodeId, order: Vec<NodeId>) -> Result<()> {
        let current = match self.nodes.get(&parent.0) {
            Some(node) => &node.children,
            None => return Err(TreeViewError::UnknownNode(parent)),
        };
        if order.len() != current.len() {
            return Err(TreeViewError::UnknownNode(parent));
        }
        for id in &order {
            if !current.contains(id) {
                return Err(TreeViewError::UnknownNode(*id));
            }
        }
        if let Some(node) = self.nodes.get_mut(&parent.0) {
            node.children = order;
        }
        Ok(())
    }

    pub fn visible_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().map(|k| NodeId(*k))
    }
}
