use crate::database::entity_store::EntityStore;
use crate::error::app_error::AppError;
use crate::models::session::{ConflictReport, Session, SessionDraft, SessionPatch, SessionRequest};
use crate::service::conflict::{ConflictChecker, rejection};
use crate::service::locks::PartitionLocks;
use crate::service::validation::{check_interval, validate_new_session, validate_preview_patch, validate_session_patch};
use tracing::{info, warn};
use uuid::Uuid;

/// Validate-then-commit for sessions.
///
/// Holds no schedule state of its own: every check re-reads the store, and
/// the partition locks are held from the conflict read until the write lands.
pub struct SessionAdmissionService<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    locks: &'a PartitionLocks,
}

impl<'a, S: EntityStore + ?Sized> SessionAdmissionService<'a, S> {
    pub fn new(store: &'a S, locks: &'a PartitionLocks) -> Self {
        SessionAdmissionService { store, locks }
    }

    pub async fn admit_new_session(&self, request: &SessionRequest) -> Result<Session, AppError> {
        let draft = validate_new_session(request)?;
        self.check_references(&draft).await?;

        let _guard = self.locks.acquire_for(&[&draft]).await;
        self.reject_conflicts(&draft, None).await?;
        let session = self.store.insert_session(&draft).await?;

        info!(
            session_id = %session.id,
            room_id = %session.room_id,
            instructor_id = %session.instructor_id,
            day = %session.day,
            start_time = %session.start_time,
            end_time = %session.end_time,
            "session admitted"
        );
        Ok(session)
    }

    /// Overlays `request` on the stored session and validates the result as
    /// if it were being created, excluding the session itself from conflicts.
    pub async fn admit_session_update(&self, id: &Uuid, request: &SessionRequest) -> Result<Session, AppError> {
        let patch = validate_session_patch(request)?;
        let existing = self.existing_session(id).await?;

        let draft = SessionDraft::overlay(&existing, &patch);
        check_interval(&draft)?;
        self.check_references(&draft).await?;

        let current = existing.draft();
        let _guard = self.locks.acquire_for(&[&current, &draft]).await;
        self.reject_conflicts(&draft, Some(id)).await?;

        // Every field is written so the stored row is exactly the draft that was checked.
        let session = self
            .store
            .patch_session(id, &full_patch(&draft))
            .await?
            .ok_or_else(|| AppError::not_found("Timetable entry not found"))?;

        info!(
            session_id = %session.id,
            room_id = %session.room_id,
            instructor_id = %session.instructor_id,
            day = %session.day,
            start_time = %session.start_time,
            end_time = %session.end_time,
            "session updated"
        );
        Ok(session)
    }

    /// Deleting can only free resources, so no conflict check runs.
    pub async fn remove_session(&self, id: &Uuid) -> Result<bool, AppError> {
        self.existing_session(id).await?;
        let deleted = self.store.delete_session(id).await?;
        if deleted {
            info!(session_id = %id, "session removed");
        }
        Ok(deleted)
    }

    /// Read-only preview of what admitting `request` would collide with.
    ///
    /// With `exclude_id` the request is treated as a partial edit of that
    /// session; without it every field is required.
    pub async fn list_conflicts(&self, request: &SessionRequest, exclude_id: Option<&Uuid>) -> Result<ConflictReport, AppError> {
        let draft = match exclude_id {
            Some(id) => {
                let patch = validate_preview_patch(request)?;
                let existing = self.existing_session(id).await?;
                let draft = SessionDraft::overlay(&existing, &patch);
                check_interval(&draft)?;
                draft
            }
            None => validate_new_session(request)?,
        };

        ConflictChecker::new(self.store).check_conflicts(&draft, exclude_id).await
    }

    async fn existing_session(&self, id: &Uuid) -> Result<Session, AppError> {
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| AppError::not_found("Timetable entry not found"))
    }

    /// Module, instructor (with eligibility) and room, reported in that order.
    async fn check_references(&self, draft: &SessionDraft) -> Result<(), AppError> {
        let (module, instructor, room) = tokio::try_join!(
            self.store.get_module(&draft.module_id),
            self.store.get_user(&draft.instructor_id),
            self.store.get_room(&draft.room_id),
        )?;

        if module.is_none() {
            return Err(AppError::not_found("Module not found"));
        }
        let Some(instructor) = instructor else {
            return Err(AppError::not_found("Instructor not found"));
        };
        if !instructor.role.can_instruct() {
            return Err(AppError::IneligibleInstructor(instructor.id));
        }
        if room.is_none() {
            return Err(AppError::not_found("Room not found"));
        }
        Ok(())
    }

    async fn reject_conflicts(&self, draft: &SessionDraft, exclude: Option<&Uuid>) -> Result<(), AppError> {
        let report = ConflictChecker::new(self.store).check_conflicts(draft, exclude).await?;
        match rejection(report) {
            Some(err) => {
                let conflicting: Vec<String> = err.conflicting_sessions().iter().map(|s| s.id.to_string()).collect();
                warn!(
                    room_id = %draft.room_id,
                    instructor_id = %draft.instructor_id,
                    day = %draft.day,
                    start_time = %draft.start_time,
                    end_time = %draft.end_time,
                    conflicting = ?conflicting,
                    reason = %err,
                    "session rejected"
                );
                Err(err)
            }
            None => Ok(()),
        }
    }
}

fn full_patch(draft: &SessionDraft) -> SessionPatch {
    SessionPatch {
        module_id: Some(draft.module_id),
        instructor_id: Some(draft.instructor_id),
        room_id: Some(draft.room_id),
        day: Some(draft.day),
        start_time: Some(draft.start_time),
        end_time: Some(draft.end_time),
        session_type: Some(draft.session_type),
    }
}
