use crate::database::entity_store::EntityStore;
use crate::error::app_error::AppError;
use crate::models::schedule::{DayOfWeek, ResourceKind, TimeOfDay};
use crate::models::session::{Session, SessionDraft};
use uuid::Uuid;

/// Half-open `[start, end)` interval within one day. `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::validation("Start time must be before end time"));
        }
        Ok(Self { start, end })
    }

    pub fn of_session(session: &Session) -> Self {
        Self {
            start: session.start_time,
            end: session.end_time,
        }
    }

    pub fn of_draft(draft: &SessionDraft) -> Result<Self, AppError> {
        Self::new(draft.start_time, draft.end_time)
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`; touching
/// intervals do not.
pub fn overlaps(s1: TimeOfDay, e1: TimeOfDay, s2: TimeOfDay, e2: TimeOfDay) -> bool {
    s1 < e2 && s2 < e1
}

/// Sessions in `partition` that overlap `range`, minus `exclude`, ordered by start time.
pub fn overlapping_in<'s>(partition: &'s [Session], range: &TimeRange, exclude: Option<&Uuid>) -> Vec<&'s Session> {
    let mut hits: Vec<&Session> = partition
        .iter()
        .filter(|session| exclude != Some(&session.id))
        .filter(|session| TimeRange::of_session(session).overlaps(range))
        .collect();
    hits.sort_by_key(|session| (session.start_time, session.end_time));
    hits
}

/// Per-(resource, day) view over the store's sessions.
pub struct IntervalIndex<'a, S: EntityStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> IntervalIndex<'a, S> {
    pub fn new(store: &'a S) -> Self {
        IntervalIndex { store }
    }

    pub async fn find_overlapping(
        &self,
        kind: ResourceKind,
        resource_id: &Uuid,
        day: DayOfWeek,
        range: &TimeRange,
        exclude: Option<&Uuid>,
    ) -> Result<Vec<Session>, AppError> {
        let partition = self.store.find_sessions_by_resource_and_day(kind, resource_id, day).await?;
        // The store is trusted for the partition key, but re-filter so a loose
        // implementation can never leak another resource's sessions.
        let partition: Vec<Session> = partition
            .into_iter()
            .filter(|session| session.day == day && session.resource_id(kind) == *resource_id)
            .collect();

        Ok(overlapping_in(&partition, range, exclude).into_iter().cloned().collect())
    }
}
