/*
 * Cross-thread messages and the posting seam. Background workers never
 * touch tree state; they post a `TreeMessage` through
 * `MessagePosterOperations` and the interactive thread dequeues it later.
 * Directory-change notices from the host's monitoring facility travel the
 * same way.
 */
use crate::core::models::ItemIdentity;
use crate::core::result_store::ResultId;
use std::sync::Mutex;
use std::sync::mpsc::Sender;

// A change observed under a monitored directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellChange {
    Created {
        parent: ItemIdentity,
        name: String,
    },
    Removed {
        identity: ItemIdentity,
    },
    Renamed {
        old: ItemIdentity,
        new: ItemIdentity,
    },
}

// Messages consumed on the interactive thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMessage {
    IconResultReady(ResultId),
    SubfoldersResultReady(ResultId),
    ShellChange(ShellChange),
}

pub trait MessagePosterOperations: Send + Sync {
    /// Posts a message for later consumption on the interactive thread.
    /// Posting after the consumer is gone is a silent no-op.
    fn post(&self, message: TreeMessage);
}

// Channel-backed poster. Contention on the mutex is one enqueue per
// completed background task.
pub struct QueueMessagePoster {
    sender: Mutex<Sender<TreeMessage>>,
}

impl QueueMessagePoster {
    pub fn new(sender: Sender<TreeMessage>) -> Self {
        QueueMessagePoster {
            sender: Mutex::new(sender),
        }
    }
}

impl MessagePosterOperations for QueueMessagePoster {
    fn post(&self, message: TreeMessage) {
        match self.sender.lock() {
            Ok(sender) => {
                // A closed receiver means shutdown already began; the
                // message is intentionally dropped.
                if sender.send(message).is_err() {
                    log::trace!("QueueMessagePoster: Receiver gone, message dropped.");
                }
            }
            Err(_) => log::error!("QueueMessagePoster: Sender mutex poisoned, message dropped."),
        }
    }
}
