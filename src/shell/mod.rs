/*
 * The external services the tree engine consumes, each behind an
 * `XxxOperations` trait with one concrete implementation: the shell
 * namespace (enumeration, names, attributes, icons, monitoring), file
 * actions (rename/delete/create), and clipboard / drag-and-drop transfer.
 */
pub mod file_actions;
pub mod namespace;
pub mod transfer;

pub use namespace::{
    EnumerationFilter, FileSystemNamespace, NamespaceError, ShellNamespaceOperations,
};

pub use file_actions::{CoreFileActionHandler, FileActionError, FileActionOperations};

pub use transfer::{
    DataObject, DataObjectId, DragOutcome, DropEffect, ProcessClipboard, TransferError,
    TransferOperations,
};
