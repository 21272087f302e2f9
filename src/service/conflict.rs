use crate::database::entity_store::EntityStore;
use crate::error::app_error::AppError;
use crate::models::schedule::ResourceKind;
use crate::models::session::{ConflictReport, SessionDraft};
use crate::service::interval::{IntervalIndex, TimeRange};
use tracing::debug;
use uuid::Uuid;

pub struct ConflictChecker<'a, S: EntityStore + ?Sized> {
    index: IntervalIndex<'a, S>,
}

impl<'a, S: EntityStore + ?Sized> ConflictChecker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        ConflictChecker {
            index: IntervalIndex::new(store),
        }
    }

    /// Both axes are always queried, so the report lists every collision.
    pub async fn check_conflicts(&self, candidate: &SessionDraft, exclude: Option<&Uuid>) -> Result<ConflictReport, AppError> {
        let range = TimeRange::of_draft(candidate)?;

        let (room_conflicts, instructor_conflicts) = tokio::try_join!(
            self.index
                .find_overlapping(ResourceKind::Room, &candidate.room_id, candidate.day, &range, exclude),
            self.index
                .find_overlapping(ResourceKind::Instructor, &candidate.instructor_id, candidate.day, &range, exclude),
        )?;

        debug!(
            room_id = %candidate.room_id,
            instructor_id = %candidate.instructor_id,
            day = %candidate.day,
            start_time = %candidate.start_time,
            end_time = %candidate.end_time,
            room_conflicts = room_conflicts.len(),
            instructor_conflicts = instructor_conflicts.len(),
            "conflict check"
        );

        Ok(ConflictReport {
            room_conflicts,
            instructor_conflicts,
        })
    }
}

/// Room conflicts take precedence; only one category is reported per rejection.
pub fn rejection(report: ConflictReport) -> Option<AppError> {
    if !report.room_conflicts.is_empty() {
        return Some(AppError::conflict(ResourceKind::Room, report.room_conflicts));
    }
    if !report.instructor_conflicts.is_empty() {
        return Some(AppError::conflict(ResourceKind::Instructor, report.instructor_conflicts));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::DayOfWeek;
    use crate::test_utils::{InMemoryStore, sample_session};

    #[tokio::test]
    async fn test_reports_both_axes_independently() {
        let store = InMemoryStore::default();
        let in_room = sample_session(DayOfWeek::Monday, "09:00:00", "10:00:00");
        let with_instructor = sample_session(DayOfWeek::Monday, "10:30:00", "11:30:00");
        store.seed_sessions([in_room.clone(), with_instructor.clone()]).await;

        let candidate = SessionDraft {
            room_id: in_room.room_id,
            instructor_id: with_instructor.instructor_id,
            start_time: "09:30:00".parse().unwrap(),
            end_time: "11:00:00".parse().unwrap(),
            ..in_room.draft()
        };

        let report = ConflictChecker::new(&store).check_conflicts(&candidate, None).await.unwrap();

        assert_eq!(report.room_conflicts, vec![in_room]);
        assert_eq!(report.instructor_conflicts, vec![with_instructor]);
        assert!(!report.is_clear());
    }

    #[tokio::test]
    async fn test_excluded_session_never_conflicts_with_itself() {
        let store = InMemoryStore::default();
        let session = sample_session(DayOfWeek::Wednesday, "14:00:00", "16:00:00");
        store.seed_sessions([session.clone()]).await;

        let checker = ConflictChecker::new(&store);
        let report = checker.check_conflicts(&session.draft(), Some(&session.id)).await.unwrap();
        assert!(report.is_clear());

        let report = checker.check_conflicts(&session.draft(), None).await.unwrap();
        assert_eq!(report.room_conflicts.len(), 1);
        assert_eq!(report.instructor_conflicts.len(), 1);
    }

    #[test]
    fn test_rejection_prefers_room_conflicts() {
        let a = sample_session(DayOfWeek::Monday, "09:00:00", "10:00:00");
        let b = sample_session(DayOfWeek::Monday, "09:00:00", "10:00:00");

        let both = ConflictReport {
            room_conflicts: vec![a.clone()],
            instructor_conflicts: vec![b.clone()],
        };
        assert!(matches!(rejection(both), Some(AppError::RoomConflict(sessions)) if sessions == [a.clone()]));

        let instructor_only = ConflictReport {
            room_conflicts: vec![],
            instructor_conflicts: vec![b.clone()],
        };
        assert!(matches!(rejection(instructor_only), Some(AppError::InstructorConflict(sessions)) if sessions == [b.clone()]));

        assert!(rejection(ConflictReport::default()).is_none());
    }
}
