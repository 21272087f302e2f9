use crate::error::app_error::AppError;
use crate::models::module::Module;
use crate::models::room::Room;
use crate::models::schedule::{DayOfWeek, ResourceKind};
use crate::models::session::{Session, SessionDetails, SessionDraft, SessionFilter, SessionPatch};
use crate::models::user::User;
use uuid::Uuid;

/// Capabilities the scheduling core needs from whatever owns the entities.
///
/// Conflict truth always comes from here; nothing above this trait caches
/// sessions between calls.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_module(&self, id: &Uuid) -> Result<Option<Module>, AppError>;
    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    async fn get_room(&self, id: &Uuid) -> Result<Option<Room>, AppError>;
    async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, AppError>;

    /// Every session occupying `resource_id` on `day`, in any order.
    async fn find_sessions_by_resource_and_day(&self, kind: ResourceKind, resource_id: &Uuid, day: DayOfWeek) -> Result<Vec<Session>, AppError>;

    async fn insert_session(&self, draft: &SessionDraft) -> Result<Session, AppError>;

    /// Applies the present fields and refreshes `updated_at`. `None` if the
    /// session does not exist.
    async fn patch_session(&self, id: &Uuid, patch: &SessionPatch) -> Result<Option<Session>, AppError>;

    /// `true` if a row was deleted.
    async fn delete_session(&self, id: &Uuid) -> Result<bool, AppError>;
}

/// Read-side listings backing the timetable views.
#[async_trait::async_trait]
pub trait TimetableRepository: EntityStore {
    /// Sessions matching `filter`, ordered by day (Monday first) then start time.
    async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, AppError>;

    /// Same selection and order as [`list_sessions`](Self::list_sessions), joined
    /// with module, instructor and room display fields.
    async fn list_session_details(&self, filter: &SessionFilter) -> Result<Vec<SessionDetails>, AppError>;

    async fn get_session_details(&self, id: &Uuid) -> Result<Option<SessionDetails>, AppError>;

    /// All rooms ordered by building then name.
    async fn list_rooms(&self) -> Result<Vec<Room>, AppError>;
}
