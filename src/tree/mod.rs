/*
 * This module provides the tree engine itself: the visible tree state, the
 * synchronizer that populates and tears it down, the interaction handler
 * for clipboard / drag / rename / delete, and the cross-thread message
 * types. Unit tests for the orchestrators are in `synchronizer_tests.rs`
 * and `interaction_tests.rs`.
 */
pub mod events;
pub mod interaction;
pub mod synchronizer;
pub mod view;

#[cfg(test)]
mod synchronizer_tests;

pub use events::{MessagePosterOperations, QueueMessagePoster, ShellChange, TreeMessage};
pub use interaction::InteractionHandler;
pub use synchronizer::{DisplayInfo, SyncError, TreeSynchronizer};
pub use view::{NodeId, PopulationPhase, TreeViewState};
