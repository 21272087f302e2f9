use crate::models::schedule::{DayOfWeek, ResourceKind};
use crate::models::session::SessionDraft;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One `(resource, day)` slice of the schedule; the unit of mutual exclusion
/// for admissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub kind: ResourceKind,
    pub resource_id: Uuid,
    pub day: DayOfWeek,
}

impl PartitionKey {
    pub fn of_draft(kind: ResourceKind, draft: &SessionDraft) -> Self {
        PartitionKey {
            kind,
            resource_id: draft.resource_id(kind),
            day: draft.day,
        }
    }
}

/// Per-partition async mutexes held across check-then-write.
///
/// Keys are always locked in sorted order, so two admissions touching the same
/// pair of partitions cannot deadlock.
#[derive(Default)]
pub struct PartitionLocks {
    table: Mutex<HashMap<PartitionKey, Arc<Mutex<()>>>>,
}

/// Holds every partition lock taken by one admission. Released on drop.
#[derive(Debug)]
pub struct PartitionGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl PartitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, keys: impl IntoIterator<Item = PartitionKey>) -> PartitionGuard {
        let ordered: BTreeSet<PartitionKey> = keys.into_iter().collect();

        let mutexes: Vec<Arc<Mutex<()>>> = {
            let mut table = self.table.lock().await;
            // Idle entries are dropped when nobody else references them.
            table.retain(|_, mutex| Arc::strong_count(mutex) > 1);
            ordered.iter().map(|key| table.entry(*key).or_default().clone()).collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }

        PartitionGuard { _guards: guards }
    }

    /// Locks every partition the draft touches (its room and its instructor on its day).
    pub async fn acquire_for(&self, drafts: &[&SessionDraft]) -> PartitionGuard {
        let keys = drafts
            .iter()
            .flat_map(|draft| [PartitionKey::of_draft(ResourceKind::Room, draft), PartitionKey::of_draft(ResourceKind::Instructor, draft)]);
        self.acquire(keys).await
    }

    #[cfg(test)]
    async fn tracked_partitions(&self) -> usize {
        self.table.lock().await.len()
    }
}
