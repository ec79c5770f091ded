/*
 * Holds the pending results of background tasks until the interactive
 * thread consumes them. Each entry is keyed by a generated result id that
 * travels inside the completion message; consumption removes the entry
 * unconditionally, so processing the same completion message twice has no
 * effect the second time, and a message for an id that was never registered
 * (or already consumed) is a no-op.
 */
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};

// Identifies one pending background result. Monotonic, scoped per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultId(pub u64);

/*
 * The consuming half of a single-use payload channel. The worker sends the
 * payload (if its query succeeded) before posting the completion message,
 * so by the time the message is dequeued the payload is observable here. A
 * worker whose query failed posts the message without sending anything;
 * consuming such an entry yields `None` and still reclaims it.
 */
#[derive(Debug)]
pub struct PendingResult<T> {
    receiver: Receiver<T>,
}

impl<T> PendingResult<T> {
    /// Creates the payload channel for one background task.
    pub fn channel() -> (Sender<T>, PendingResult<T>) {
        let (sender, receiver) = channel();
        (sender, PendingResult { receiver })
    }

    fn take(self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

#[derive(Debug)]
pub struct ResultStore<T> {
    entries: HashMap<u64, PendingResult<T>>,
    next_id: u64,
}

impl<T> ResultStore<T> {
    pub fn new() -> Self {
        ResultStore {
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn allocate_id(&mut self) -> ResultId {
        let id = ResultId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn register(&mut self, id: ResultId, pending: PendingResult<T>) {
        self.entries.insert(id.0, pending);
    }

    /*
     * Removes and resolves the entry for `id`. Returns `None` both for an
     * unknown id and for an entry whose task delivered no payload; the
     * distinction does not matter to the caller, which treats either as a
     * benign cancellation.
     */
    pub fn consume(&mut self, id: ResultId) -> Option<T> {
        self.entries.remove(&id.0).and_then(PendingResult::take)
    }

    /// Discards every pending entry. Used during shutdown teardown.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
