//! Collection lifecycle state machine
//!
//! A provisioning run walks a collection through
//! `ABSENT -> CREATING -> INDEXED -> LOADED`. `FAILED` is reachable from any
//! state, and the only way out of it is a full re-run starting at `ABSENT`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Lifecycle state of a provisioned collection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionState {
    Absent,
    Creating,
    Indexed,
    Loaded,
    Failed,
}

impl CollectionState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: CollectionState) -> bool {
        use CollectionState::*;

        matches!(
            (self, next),
            (Absent, Creating)
                | (Creating, Indexed)
                | (Indexed, Loaded)
                // dropping a live collection starts the cycle over
                | (Indexed, Absent)
                | (Loaded, Absent)
                | (Failed, Absent)
                | (Absent | Creating | Indexed | Loaded, Failed)
        )
    }
}

/// Tracks the state of one collection across a provisioning run
#[derive(Debug, Clone)]
pub struct CollectionLifecycle {
    collection: String,
    state: CollectionState,
}

impl CollectionLifecycle {
    /// Start tracking a collection that does not exist yet
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: CollectionState::Absent,
        }
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: CollectionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::invalid_input(format!(
                "Illegal lifecycle transition for collection '{}': {} -> {}",
                self.collection, self.state, next
            )));
        }

        debug!(
            collection = %self.collection,
            from = %self.state,
            to = %next,
            "Collection lifecycle transition"
        );
        self.state = next;
        Ok(())
    }

    /// Mark the collection failed and wrap `source` in a provisioning error
    /// tagged with the state the failure happened in
    pub fn fail(&mut self, source: Error) -> Error {
        let stage = self.state;
        self.state = CollectionState::Failed;
        Error::provisioning(self.collection.clone(), stage, source)
    }
}
