use crate::database::entity_store::TimetableRepository;
use crate::error::app_error::AppError;
use crate::models::room::Room;
use crate::models::session::{SessionDetails, SessionFilter};
use crate::service::interval::{TimeRange, overlapping_in};
use crate::service::validation::{parse_day, parse_time};
use std::collections::HashSet;
use uuid::Uuid;

pub struct TimetableService<'a, R: TimetableRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: TimetableRepository + ?Sized> TimetableService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        TimetableService { repository }
    }

    pub async fn weekly_timetable(&self, filter: &SessionFilter) -> Result<Vec<SessionDetails>, AppError> {
        self.repository.list_session_details(filter).await
    }

    pub async fn timetable_by_instructor(&self, instructor_id: &Uuid) -> Result<Vec<SessionDetails>, AppError> {
        if self.repository.get_user(instructor_id).await?.is_none() {
            return Err(AppError::not_found("Instructor not found"));
        }
        let filter = SessionFilter {
            instructor_id: Some(*instructor_id),
            ..SessionFilter::default()
        };
        self.repository.list_session_details(&filter).await
    }

    pub async fn timetable_by_module(&self, module_id: &Uuid) -> Result<Vec<SessionDetails>, AppError> {
        if self.repository.get_module(module_id).await?.is_none() {
            return Err(AppError::not_found("Module not found"));
        }
        let filter = SessionFilter {
            module_id: Some(*module_id),
            ..SessionFilter::default()
        };
        self.repository.list_session_details(&filter).await
    }

    pub async fn get_session(&self, id: &Uuid) -> Result<SessionDetails, AppError> {
        self.repository
            .get_session_details(id)
            .await?
            .ok_or_else(|| AppError::not_found("Timetable entry not found"))
    }

    pub async fn get_room(&self, id: &Uuid) -> Result<Room, AppError> {
        self.repository.get_room(id).await?.ok_or_else(|| AppError::not_found("Room not found"))
    }

    /// Rooms with no session on `day` overlapping `[start_time, end_time)`.
    pub async fn available_rooms(&self, day: Option<&str>, start_time: Option<&str>, end_time: Option<&str>) -> Result<Vec<Room>, AppError> {
        let (Some(day), Some(start_time), Some(end_time)) = (day, start_time, end_time) else {
            return Err(AppError::validation("Day, start time, and end time are required"));
        };
        let day = parse_day(day)?;
        let range = TimeRange::new(parse_time(start_time)?, parse_time(end_time)?)?;

        let filter = SessionFilter {
            day: Some(day),
            ..SessionFilter::default()
        };
        let sessions = self.repository.list_sessions(&filter).await?;
        let busy: HashSet<Uuid> = overlapping_in(&sessions, &range, None).into_iter().map(|session| session.room_id).collect();

        let rooms = self.repository.list_rooms().await?;
        Ok(rooms.into_iter().filter(|room| !busy.contains(&room.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entity_store::EntityStore;
    use crate::models::schedule::DayOfWeek;
    use crate::models::session::SessionPatch;
    use crate::models::user::Role;
    use crate::test_utils::{InMemoryStore, sample_session};

    fn ids(details: &[SessionDetails]) -> Vec<Uuid> {
        details.iter().map(|entry| entry.session.id).collect()
    }

    #[tokio::test]
    async fn test_weekly_timetable_orders_by_day_then_start() {
        let store = InMemoryStore::default();
        let friday = store.seed_scheduled(DayOfWeek::Friday, "08:00:00", "09:00:00").await;
        let monday_late = store.seed_scheduled(DayOfWeek::Monday, "14:00:00", "15:00:00").await;
        let monday_early = store.seed_scheduled(DayOfWeek::Monday, "09:00:00", "10:00:00").await;

        let sessions = TimetableService::new(&store).weekly_timetable(&SessionFilter::default()).await.unwrap();
        assert_eq!(ids(&sessions), vec![monday_early.id, monday_late.id, friday.id]);

        let filter = SessionFilter {
            day: Some(DayOfWeek::Monday),
            room_id: Some(monday_early.room_id),
            ..SessionFilter::default()
        };
        let sessions = TimetableService::new(&store).weekly_timetable(&filter).await.unwrap();
        assert_eq!(ids(&sessions), vec![monday_early.id]);
    }

    #[tokio::test]
    async fn test_listings_carry_module_instructor_and_room_fields() {
        let store = InMemoryStore::default();
        let session = store.seed_scheduled(DayOfWeek::Tuesday, "10:00:00", "11:00:00").await;
        let instructor = store.get_user(&session.instructor_id).await.unwrap().unwrap();
        let room = store.get_room(&session.room_id).await.unwrap().unwrap();

        let service = TimetableService::new(&store);
        let details = service.get_session(&session.id).await.unwrap();

        assert_eq!(details.session, session);
        assert_eq!(details.module_code, "CS101");
        assert_eq!(details.module_name, "Introduction to Programming");
        assert_eq!(details.instructor_name, instructor.name);
        assert_eq!(details.instructor_email, instructor.email);
        assert_eq!(details.room_name, room.name);
        assert_eq!(details.room_type, room.room_type);
        assert_eq!(details.building.as_deref(), Some("Main"));

        let listed = service.weekly_timetable(&SessionFilter::default()).await.unwrap();
        assert_eq!(listed, vec![details]);
    }

    #[tokio::test]
    async fn test_timetable_by_instructor() {
        let store = InMemoryStore::default();
        let taught = store.seed_scheduled(DayOfWeek::Tuesday, "10:00:00", "11:00:00").await;
        store.seed_scheduled(DayOfWeek::Tuesday, "10:00:00", "11:00:00").await;

        let service = TimetableService::new(&store);
        assert_eq!(ids(&service.timetable_by_instructor(&taught.instructor_id).await.unwrap()), vec![taught.id]);
        assert!(matches!(service.timetable_by_instructor(&Uuid::new_v4()).await, Err(AppError::NotFound(_))));

        let idle = store.seed_user(Role::Faculty).await;
        assert!(service.timetable_by_instructor(&idle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timetable_by_module() {
        let store = InMemoryStore::default();
        let first = store.seed_scheduled(DayOfWeek::Thursday, "13:00:00", "14:00:00").await;
        let parallel = store.seed_scheduled(DayOfWeek::Thursday, "13:00:00", "14:00:00").await;
        let same_module = SessionPatch {
            module_id: Some(first.module_id),
            ..SessionPatch::default()
        };
        store.patch_session(&parallel.id, &same_module).await.unwrap();

        let service = TimetableService::new(&store);
        let sessions = service.timetable_by_module(&first.module_id).await.unwrap();
        assert_eq!(ids(&sessions), vec![first.id, parallel.id]);
        assert!(sessions.iter().all(|entry| entry.session.module_id == first.module_id));
        assert!(matches!(service.timetable_by_module(&Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let store = InMemoryStore::default();
        let result = TimetableService::new(&store).get_session(&Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(message)) if message == "Timetable entry not found"));
    }

    #[tokio::test]
    async fn test_available_rooms_excludes_overlapping_only() {
        let store = InMemoryStore::default();
        let busy = store.seed_room("A1").await;
        let adjacent = store.seed_room("A2").await;
        let free = store.seed_room("B1").await;

        let mut in_busy = sample_session(DayOfWeek::Monday, "09:00:00", "10:00:00");
        in_busy.room_id = busy.id;
        let mut in_adjacent = sample_session(DayOfWeek::Monday, "10:00:00", "11:00:00");
        in_adjacent.room_id = adjacent.id;
        let mut other_day = sample_session(DayOfWeek::Tuesday, "09:00:00", "10:00:00");
        other_day.room_id = free.id;
        store.seed_sessions([in_busy, in_adjacent, other_day]).await;

        let rooms = TimetableService::new(&store)
            .available_rooms(Some("monday"), Some("09:30:00"), Some("10:00:00"))
            .await
            .unwrap();
        let ids: Vec<Uuid> = rooms.iter().map(|room| room.id).collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&adjacent.id));
        assert!(ids.contains(&free.id));
    }

    #[tokio::test]
    async fn test_available_rooms_validates_input() {
        let store = InMemoryStore::default();
        let service = TimetableService::new(&store);

        assert!(matches!(service.available_rooms(Some("MONDAY"), None, Some("10:00:00")).await, Err(AppError::Validation(_))));
        assert!(matches!(
            service.available_rooms(Some("Someday"), Some("09:00:00"), Some("10:00:00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.available_rooms(Some("MONDAY"), Some("9:00"), Some("10:00:00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.available_rooms(Some("MONDAY"), Some("10:00:00"), Some("10:00:00")).await,
            Err(AppError::Validation(_))
        ));
    }
}
