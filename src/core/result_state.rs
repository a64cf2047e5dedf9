// src/core/result_state.rs
//! Latest settled result per workflow.
//!
//! Each slot is a `watch` channel holding the whole record, so a
//! successful settlement replaces matches and keywords together and readers
//! never observe a mix of old and new fields. Failures never touch a slot.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::types::{CustomResult, DatasetResultSet, MatchOutcome, Settled};

/// How concurrent settlements of the same workflow are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyPolicy {
    /// Whichever response arrives last overwrites the slot, regardless of
    /// the order requests were sent in.
    #[default]
    LastResponseWins,
    /// A response is dropped when a later-dispatched request has already
    /// been applied.
    LatestRequestWins,
}

/// What happened to a settlement handed to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    Applied,
    Superseded,
}

pub type DatasetSlot = Option<Settled<DatasetResultSet>>;
pub type CustomSlot = Option<Settled<CustomResult>>;

pub struct ResultStateManager {
    policy: ConsistencyPolicy,
    dataset: watch::Sender<DatasetSlot>,
    custom: watch::Sender<CustomSlot>,
}

impl Default for ResultStateManager {
    fn default() -> Self {
        Self::new(ConsistencyPolicy::default())
    }
}

fn swap_in<T>(
    slot: &watch::Sender<Option<Settled<T>>>,
    policy: ConsistencyPolicy,
    incoming: Settled<T>,
) -> SlotUpdate {
    let applied = slot.send_if_modified(move |current| {
        let stale = match (policy, current.as_ref()) {
            (ConsistencyPolicy::LatestRequestWins, Some(held)) => {
                incoming.sequence < held.sequence
            }
            _ => false,
        };
        if stale {
            return false;
        }
        *current = Some(incoming);
        true
    });

    if applied {
        SlotUpdate::Applied
    } else {
        SlotUpdate::Superseded
    }
}

impl ResultStateManager {
    pub fn new(policy: ConsistencyPolicy) -> Self {
        let (dataset, _) = watch::channel(None);
        let (custom, _) = watch::channel(None);
        Self {
            policy,
            dataset,
            custom,
        }
    }

    pub fn policy(&self) -> ConsistencyPolicy {
        self.policy
    }

    /// On success, replace the dataset record as one unit. A failure is
    /// handed back to the caller and the slot is left untouched.
    pub fn update_dataset(
        &self,
        outcome: MatchOutcome<Settled<DatasetResultSet>>,
    ) -> MatchOutcome<SlotUpdate> {
        let settled = outcome?;
        let sequence = settled.sequence;
        let matches = settled.value.matches.len();

        let update = swap_in(&self.dataset, self.policy, settled);
        match update {
            SlotUpdate::Applied => info!(
                "Dataset results replaced by request #{} ({} matches)",
                sequence, matches
            ),
            SlotUpdate::Superseded => debug!("Dataset request #{} superseded", sequence),
        }
        Ok(update)
    }

    pub fn update_custom(
        &self,
        outcome: MatchOutcome<Settled<CustomResult>>,
    ) -> MatchOutcome<SlotUpdate> {
        let settled = outcome?;
        let sequence = settled.sequence;

        let update = swap_in(&self.custom, self.policy, settled);
        match update {
            SlotUpdate::Applied => info!("Custom result replaced by request #{}", sequence),
            SlotUpdate::Superseded => debug!("Custom request #{} superseded", sequence),
        }
        Ok(update)
    }

    pub fn snapshot_dataset(&self) -> DatasetSlot {
        self.dataset.borrow().clone()
    }

    pub fn snapshot_custom(&self) -> CustomSlot {
        self.custom.borrow().clone()
    }

    pub fn subscribe_dataset(&self) -> watch::Receiver<DatasetSlot> {
        self.dataset.subscribe()
    }

    pub fn subscribe_custom(&self) -> watch::Receiver<CustomSlot> {
        self.custom.subscribe()
    }
}
