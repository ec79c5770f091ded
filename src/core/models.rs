/*
 * This module defines the value types shared across the tree engine: item
 * identities, item attributes, icon descriptors, transfer effects, and the
 * resolved sort keys consumed by the comparator. Everything here is plain
 * owned data with value semantics; no type owns a native resource.
 */
use std::fmt;
use std::path::PathBuf;

/*
 * An opaque identifier for a location in the shell namespace. It replaces a
 * reference-counted native identifier with an owned sequence of namespace
 * segment names, so cloning an identity is a structural copy and dropping one
 * never touches the namespace service.
 *
 * The namespace root is the empty sequence. Only the namespace service
 * interprets segments; the tree engine relies solely on equality, hashing
 * and the ancestry relation below.
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIdentity {
    segments: Vec<String>,
}

impl ItemIdentity {
    pub fn root() -> Self {
        ItemIdentity {
            segments: Vec::new(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ItemIdentity {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the identity of a direct child of this item.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        ItemIdentity { segments }
    }

    /// Returns the parent identity, or `None` for the namespace root.
    pub fn parent(&self) -> Option<ItemIdentity> {
        if self.segments.is_empty() {
            return None;
        }
        Some(ItemIdentity {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_namespace_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /*
     * Strict ancestry: true when `other` lies somewhere below this identity.
     * An identity is not its own ancestor. This is the structural test the
     * tree walker uses to decide which branch to descend into.
     */
    pub fn is_ancestor_of(&self, other: &ItemIdentity) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    pub(crate) fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.segments.join("/"))
        }
    }
}

// Attribute flags the namespace service reports for an item. Capability
// flags (`can_*`) drive the permitted drag-and-drop effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemAttributes {
    pub is_hidden: bool,
    pub is_system: bool,
    pub is_filesystem_root: bool,
    pub pinned_to_tree: bool,
    pub can_copy: bool,
    pub can_move: bool,
    pub can_link: bool,
}

// A resolved icon: an index into the host's image list, plus an optional
// overlay index (e.g. the shortcut arrow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDescriptor {
    pub index: u32,
    pub overlay: Option<u32>,
}

impl IconDescriptor {
    pub fn plain(index: u32) -> Self {
        IconDescriptor {
            index,
            overlay: None,
        }
    }
}

/*
 * The set of transfer effects permitted for a drag or paste operation.
 * Kept as named booleans rather than a bit mask so call sites read as the
 * capability checks they are.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropEffects {
    pub copy: bool,
    pub move_item: bool,
    pub link: bool,
}

impl DropEffects {
    pub fn none(&self) -> bool {
        !self.copy && !self.move_item && !self.link
    }

    pub fn copy_and_move() -> Self {
        DropEffects {
            copy: true,
            move_item: true,
            link: false,
        }
    }

    /// Effects permitted for an item, derived from its capability flags.
    pub fn from_attributes(attributes: &ItemAttributes) -> Self {
        DropEffects {
            copy: attributes.can_copy,
            move_item: attributes.can_move,
            link: attributes.can_link,
        }
    }
}

/*
 * The data the comparator orders siblings by, resolved once per item when a
 * directory is expanded. `parsing_path` is absent for virtual-only items,
 * which is itself significant to the ordering.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub is_filesystem_root: bool,
    pub parsing_path: Option<PathBuf>,
    pub display_name: String,
}
