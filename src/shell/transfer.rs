/*
 * The clipboard / drag-and-drop seam. A transfer object placed on the
 * clipboard is identified by a generation counter, so the engine can later
 * ask "is the clipboard still holding what I put there?" without comparing
 * contents. That is the question behind clearing a stale cut mark.
 *
 * `ProcessClipboard` is the in-process implementation: it keeps the current
 * data object and records executed transfers. A platform adapter wrapping
 * the real OS clipboard and drop source implements the same trait.
 */
use crate::core::models::{DropEffects, ItemIdentity};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataObjectId(pub u64);

// A transfer payload: the items placed on the clipboard and whether they
// were cut rather than copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataObject {
    pub id: DataObjectId,
    pub items: Vec<ItemIdentity>,
    pub cut: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
    Move,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Completed(DropEffect),
    Cancelled,
}

#[derive(Debug)]
pub enum TransferError {
    EmptySelection,
    NothingToPaste,
    ClipboardUnavailable,
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::EmptySelection => write!(f, "No items to transfer"),
            TransferError::NothingToPaste => write!(f, "Clipboard holds no transferable data"),
            TransferError::ClipboardUnavailable => write!(f, "Clipboard is unavailable"),
        }
    }
}

impl std::error::Error for TransferError {}

pub type Result<T> = std::result::Result<T, TransferError>;

pub trait TransferOperations: Send + Sync {
    /// Places a transfer object on the clipboard and returns its id.
    fn place_on_clipboard(&self, items: &[ItemIdentity], cut: bool) -> Result<DataObjectId>;

    /// The id of the object currently on the clipboard, if any.
    fn current_object_id(&self) -> Option<DataObjectId>;

    fn clipboard_object(&self) -> Option<DataObject>;

    /// Whether the clipboard contents can be pasted onto `target` with one
    /// of the requested effects via the shell's own paste action.
    fn can_shell_paste(&self, target: &ItemIdentity, effects: DropEffects) -> bool;

    fn shell_paste(&self, target: &ItemIdentity) -> Result<()>;

    /// Pastes the clipboard contents onto `target` as shortcuts rather than
    /// copies, via the shell's own paste-link action.
    fn shell_paste_shortcut(&self, target: &ItemIdentity) -> Result<()>;

    /// Manual fallback: copy the clipboard payload to a destination path.
    fn copy_payload_to(&self, destination: &Path) -> Result<()>;

    /// Runs a drag operation for `items` with the allowed effects. The
    /// caller has already refused the drag when no effect is permitted.
    fn begin_drag(&self, items: &[ItemIdentity], allowed: DropEffects) -> Result<DragOutcome>;

    /// Makes clipboard contents outlive this process where the platform
    /// supports it. Called once during shutdown.
    fn flush(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRecord {
    ShellPaste {
        object: DataObjectId,
        target: ItemIdentity,
    },
    ShortcutPaste {
        object: DataObjectId,
        target: ItemIdentity,
    },
    ManualCopy {
        object: DataObjectId,
        destination: std::path::PathBuf,
    },
    Flushed {
        object: DataObjectId,
    },
}

#[derive(Debug, Default)]
struct ClipboardSlot {
    object: Option<DataObject>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct ProcessClipboard {
    slot: Mutex<ClipboardSlot>,
    executed: Mutex<Vec<TransferRecord>>,
}

impl ProcessClipboard {
    pub fn new() -> Self {
        ProcessClipboard::default()
    }

    /// The transfers executed through this clipboard, oldest first.
    pub fn executed_transfers(&self) -> Vec<TransferRecord> {
        self.executed
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn record(&self, record: TransferRecord) {
        if let Ok(mut records) = self.executed.lock() {
            records.push(record);
        }
    }
}

impl TransferOperations for ProcessClipboard {
    fn place_on_clipboard(&self, items: &[ItemIdentity], cut: bool) -> Result<DataObjectId> {
        if items.is_empty() {
            return Err(TransferError::EmptySelection);
        }
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| TransferError::ClipboardUnavailable)?;
        let id = DataObjectId(slot.next_id);
        slot.next_id += 1;
        slot.object = Some(DataObject {
            id,
            items: items.to_vec(),
            cut,
        });
        log::debug!(
            "ProcessClipboard: Placed object {} ({} item(s), cut: {cut})",
            id.0,
            items.len()
        );
        Ok(id)
    }

    fn current_object_id(&self) -> Option<DataObjectId> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.object.as_ref().map(|object| object.id))
    }

    fn clipboard_object(&self) -> Option<DataObject> {
        self.slot.lock().ok().and_then(|slot| slot.object.clone())
    }

    fn can_shell_paste(&self, _target: &ItemIdentity, effects: DropEffects) -> bool {
        if effects.none() {
            return false;
        }
        self.clipboard_object().is_some()
    }

    fn shell_paste(&self, target: &ItemIdentity) -> Result<()> {
        let object = self.clipboard_object().ok_or(TransferError::NothingToPaste)?;
        log::info!(
            "ProcessClipboard: Shell paste of object {} onto '{target}'",
            object.id.0
        );
        self.record(TransferRecord::ShellPaste {
            object: object.id,
            target: target.clone(),
        });
        Ok(())
    }

    fn shell_paste_shortcut(&self, target: &ItemIdentity) -> Result<()> {
        let object = self.clipboard_object().ok_or(TransferError::NothingToPaste)?;
        log::info!(
            "ProcessClipboard: Shortcut paste of object {} onto '{target}'",
            object.id.0
        );
        self.record(TransferRecord::ShortcutPaste {
            object: object.id,
            target: target.clone(),
        });
        Ok(())
    }

    fn copy_payload_to(&self, destination: &Path) -> Result<()> {
        let object = self.clipboard_object().ok_or(TransferError::NothingToPaste)?;
        log::info!(
            "ProcessClipboard: Manual copy of object {} to {destination:?}",
            object.id.0
        );
        self.record(TransferRecord::ManualCopy {
            object: object.id,
            destination: destination.to_path_buf(),
        });
        Ok(())
    }

    fn begin_drag(&self, items: &[ItemIdentity], allowed: DropEffects) -> Result<DragOutcome> {
        if items.is_empty() {
            return Err(TransferError::EmptySelection);
        }
        // An in-process drag has no drop target; report the strongest
        // permitted effect as the completed one.
        let effect = if allowed.move_item {
            DropEffect::Move
        } else if allowed.copy {
            DropEffect::Copy
        } else if allowed.link {
            DropEffect::Link
        } else {
            return Ok(DragOutcome::Cancelled);
        };
        log::debug!(
            "ProcessClipboard: Drag of {} item(s) completed with {effect:?}",
            items.len()
        );
        Ok(DragOutcome::Completed(effect))
    }

    fn flush(&self) -> Result<()> {
        let object = self.clipboard_object().ok_or(TransferError::NothingToPaste)?;
        log::debug!("ProcessClipboard: Flushing object {}", object.id.0);
        self.record(TransferRecord::Flushed { object: object.id });
        Ok(())
    }
}
