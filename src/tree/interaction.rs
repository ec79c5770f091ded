/*
 * User interactions that reach outside the tree: drag initiation, clipboard
 * cut/copy/paste, rename, and delete. The handler owns the clipboard state
 * (which node is marked cut, and the id of the data object this process
 * last placed on the clipboard) and delegates the destructive work to the
 * transfer and file-action services.
 *
 * Precondition failures (empty rename text, nothing pasteable, no
 * permitted drag effect) abort before any destructive call, leaving the
 * tree exactly as it was.
 */
use crate::core::models::DropEffects;
use crate::shell::file_actions::FileActionOperations;
use crate::shell::transfer::{DataObjectId, DragOutcome, TransferOperations};
use crate::tree::synchronizer::{SyncError, TreeSynchronizer};
use crate::tree::view::NodeId;
use std::sync::Arc;

#[derive(Debug)]
pub enum InteractionError {
    Sync(SyncError),
    Transfer(crate::shell::transfer::TransferError),
}

impl From<SyncError> for InteractionError {
    fn from(err: SyncError) -> Self {
        InteractionError::Sync(err)
    }
}

impl From<crate::shell::transfer::TransferError> for InteractionError {
    fn from(err: crate::shell::transfer::TransferError) -> Self {
        InteractionError::Transfer(err)
    }
}

impl std::fmt::Display for InteractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionError::Sync(e) => write!(f, "Interaction failed: {e}"),
            InteractionError::Transfer(e) => write!(f, "Transfer failed: {e}"),
        }
    }
}

impl std::error::Error for InteractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InteractionError::Sync(e) => Some(e),
            InteractionError::Transfer(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, InteractionError>;

// At most one node is marked cut at a time; `data_object` remembers what
// this process last placed on the clipboard.
#[derive(Debug, Default)]
struct ClipboardState {
    cut_node: Option<NodeId>,
    data_object: Option<DataObjectId>,
}

pub struct InteractionHandler {
    transfer: Arc<dyn TransferOperations>,
    file_actions: Arc<dyn FileActionOperations>,
    clipboard: ClipboardState,
}

impl InteractionHandler {
    pub fn new(
        transfer: Arc<dyn TransferOperations>,
        file_actions: Arc<dyn FileActionOperations>,
    ) -> Self {
        InteractionHandler {
            transfer,
            file_actions,
            clipboard: ClipboardState::default(),
        }
    }

    /*
     * Starts a drag for `node`. The permitted effects come from the item's
     * capability flags; with no permitted effect the drag is silently not
     * started. Service failures are treated the same way.
     */
    pub fn begin_drag(
        &self,
        sync: &TreeSynchronizer,
        node: NodeId,
    ) -> Result<Option<DragOutcome>> {
        let attributes = sync.attributes_of(node)?;
        let effects = DropEffects::from_attributes(&attributes);
        if effects.none() {
            log::debug!("InteractionHandler: Drag refused, no permitted effect.");
            return Ok(None);
        }
        let identity = sync.identity_of(node)?;
        match self.transfer.begin_drag(&[identity], effects) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                log::debug!("InteractionHandler: Drag not started: {e}");
                Ok(None)
            }
        }
    }

    /*
     * Places the item on the clipboard. Any previously cut node gets its
     * visual state restored before the new object is remembered; relying on
     * the clipboard-update notification instead would race, because by the
     * time it arrives the remembered state already refers to the new cut.
     */
    pub fn copy_or_cut(
        &mut self,
        sync: &mut TreeSynchronizer,
        node: NodeId,
        is_copy: bool,
    ) -> Result<()> {
        let identity = sync.identity_of(node)?;
        let object = self.transfer.place_on_clipboard(&[identity], !is_copy)?;

        if let Some(previous_cut) = self.clipboard.cut_node.take() {
            sync.set_cut_mark(previous_cut, false);
        }
        self.clipboard.data_object = Some(object);

        if !is_copy {
            sync.set_cut_mark(node, true);
            self.clipboard.cut_node = Some(node);
        }
        Ok(())
    }

    /*
     * Called when the system clipboard changes. If it no longer holds the
     * object this process placed there, the cut mark (if any) is cleared
     * and the remembered object is dropped.
     */
    pub fn on_clipboard_update(&mut self, sync: &mut TreeSynchronizer) {
        let Some(object) = self.clipboard.data_object else {
            return;
        };
        if self.transfer.current_object_id() == Some(object) {
            return;
        }
        if let Some(cut_node) = self.clipboard.cut_node.take() {
            sync.set_cut_mark(cut_node, false);
        }
        self.clipboard.data_object = None;
    }

    /*
     * Pastes onto `node`: the shell's own paste action when it accepts the
     * clipboard object for copy or move, otherwise a manual copy of the
     * payload to the target's parsing path. An empty clipboard or a target
     * without a path aborts before anything runs.
     */
    pub fn paste(&self, sync: &TreeSynchronizer, node: NodeId) -> Result<()> {
        if self.transfer.clipboard_object().is_none() {
            log::debug!("InteractionHandler: Paste skipped, clipboard empty.");
            return Ok(());
        }
        let identity = sync.identity_of(node)?;
        if self
            .transfer
            .can_shell_paste(&identity, DropEffects::copy_and_move())
        {
            self.transfer.shell_paste(&identity)?;
            return Ok(());
        }
        match sync.parsing_path_of(node)? {
            Some(path) => {
                self.transfer.copy_payload_to(&path)?;
                Ok(())
            }
            None => {
                log::debug!("InteractionHandler: Paste skipped, target '{identity}' has no path.");
                Ok(())
            }
        }
    }

    /// Pastes the clipboard contents onto `node` as shortcuts. An empty
    /// clipboard aborts before the shell action runs.
    pub fn paste_shortcut(&self, sync: &TreeSynchronizer, node: NodeId) -> Result<()> {
        if self.transfer.clipboard_object().is_none() {
            log::debug!("InteractionHandler: Shortcut paste skipped, clipboard empty.");
            return Ok(());
        }
        let identity = sync.identity_of(node)?;
        self.transfer.shell_paste_shortcut(&identity)?;
        Ok(())
    }

    /// Selects the node and returns its current label for the host's edit
    /// control to seed an in-place rename with.
    pub fn start_rename(&self, sync: &mut TreeSynchronizer, node: NodeId) -> Result<String> {
        sync.select(Some(node));
        let label = sync
            .view()
            .node(node)
            .map(|n| n.label.clone())
            .ok_or(SyncError::UnknownNode(node))?;
        Ok(label)
    }

    /*
     * Commits an in-place rename. Returns `false` when the edit should
     * revert: empty input, a target without a parsing path, or a rename
     * the file-action service refused. The new path is the old one with
     * its final segment replaced; trailing spaces in the input are
     * dropped.
     */
    pub fn commit_label_edit(
        &self,
        sync: &mut TreeSynchronizer,
        node: NodeId,
        new_text: &str,
    ) -> Result<bool> {
        let trimmed = new_text.trim_end_matches(' ');
        if trimmed.is_empty() {
            log::debug!("InteractionHandler: Empty rename input, reverting label.");
            return Ok(false);
        }
        let Some(old_path) = sync.parsing_path_of(node)? else {
            log::debug!("InteractionHandler: Rename target has no parsing path, reverting.");
            return Ok(false);
        };
        let new_path = match old_path.parent() {
            Some(parent) => parent.join(trimmed),
            None => {
                log::debug!("InteractionHandler: Cannot rename a root path, reverting.");
                return Ok(false);
            }
        };

        if let Err(e) = self.file_actions.rename(&old_path, &new_path) {
            log::warn!("InteractionHandler: Rename {old_path:?} -> {new_path:?} failed: {e}");
            return Ok(false);
        }
        // The label reflects the accepted edit immediately; the identity
        // follows through the rename change notice.
        sync.set_label(node, trimmed.to_string());
        Ok(true)
    }

    /*
     * Deletes the item behind `node`. The parent is selected first,
     * because the underlying delete cannot proceed while the doomed item
     * holds the selection lock. The tree itself is updated by the removal
     * change notice, not here.
     */
    pub fn delete(
        &self,
        sync: &mut TreeSynchronizer,
        node: NodeId,
        permanent: bool,
    ) -> Result<()> {
        let parent = sync.parent_of(node);
        if parent.is_some() {
            sync.select(parent);
        }
        let Some(path) = sync.parsing_path_of(node)? else {
            log::debug!("InteractionHandler: Delete skipped, item has no parsing path.");
            return Ok(());
        };
        if let Err(e) = self.file_actions.delete(&path, permanent) {
            log::warn!("InteractionHandler: Delete of {path:?} failed: {e}");
        }
        Ok(())
    }

    /// True when some node currently carries the cut mark.
    pub fn has_cut_item(&self) -> bool {
        self.clipboard.cut_node.is_some()
    }

    /*
     * Shutdown hook: if the clipboard still holds the object this process
     * placed there, flush it so the contents survive the process.
     */
    pub fn flush_on_shutdown(&mut self) {
        if let Some(object) = self.clipboard.data_object.take() {
            if self.transfer.current_object_id() == Some(object) {
                if let Err(e) = self.transfer.flush() {
                    log::warn!("InteractionHandler: Clipboard flush failed: {e}");
                }
            }
        }
        self.clipboard.cut_node = None;
    }
}
