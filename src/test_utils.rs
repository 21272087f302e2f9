use crate::database::entity_store::{EntityStore, TimetableRepository};
use crate::error::app_error::AppError;
use crate::models::module::Module;
use crate::models::room::Room;
use crate::models::schedule::{DayOfWeek, ResourceKind, TimeOfDay};
use crate::models::session::{Session, SessionDetails, SessionDraft, SessionFilter, SessionPatch, SessionRequest};
use crate::models::user::{Role, User};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub fn time(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

/// A stored session with fresh random module, instructor and room ids.
pub fn sample_session(day: DayOfWeek, start: &str, end: &str) -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        module_id: Uuid::new_v4(),
        instructor_id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        day,
        start_time: time(start),
        end_time: time(end),
        session_type: Default::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn session_request(module_id: Uuid, instructor_id: Uuid, room_id: Uuid, day: &str, start: &str, end: &str) -> SessionRequest {
    SessionRequest {
        module_id: Some(module_id),
        instructor_id: Some(instructor_id),
        room_id: Some(room_id),
        day: Some(day.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        session_type: None,
    }
}

#[derive(Default)]
struct State {
    modules: HashMap<Uuid, Module>,
    users: HashMap<Uuid, User>,
    rooms: HashMap<Uuid, Room>,
    // Insertion order is kept so tests can address sessions by position.
    sessions: Vec<Session>,
}

impl State {
    /// Inner join: sessions whose references are missing are skipped.
    fn details(&self, session: &Session) -> Option<SessionDetails> {
        let module = self.modules.get(&session.module_id)?;
        let instructor = self.users.get(&session.instructor_id)?;
        let room = self.rooms.get(&session.room_id)?;
        Some(SessionDetails {
            session: session.clone(),
            module_code: module.code.clone(),
            module_name: module.name.clone(),
            instructor_name: instructor.name.clone(),
            instructor_email: instructor.email.clone(),
            room_name: room.name.clone(),
            room_type: room.room_type,
            building: room.building.clone(),
        })
    }
}

/// Entity store kept in memory. Performs no conflict checks of its own, so
/// every guarantee observed in tests comes from the admission service.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub async fn seed_sessions(&self, sessions: impl IntoIterator<Item = Session>) {
        self.state.lock().await.sessions.extend(sessions);
    }

    pub async fn seed_module(&self) -> Module {
        let module = Module {
            id: Uuid::new_v4(),
            code: "CS101".to_string(),
            name: "Introduction to Programming".to_string(),
            credits: 15,
            created_at: Utc::now(),
            ..Module::default()
        };
        self.state.lock().await.modules.insert(module.id, module.clone());
        module
    }

    pub async fn seed_room(&self, name: &str) -> Room {
        let room = Room {
            id: Uuid::new_v4(),
            name: name.to_string(),
            capacity: Some(40),
            building: Some("Main".to_string()),
            created_at: Utc::now(),
            ..Room::default()
        };
        self.state.lock().await.rooms.insert(room.id, room.clone());
        room
    }

    pub async fn seed_user(&self, role: Role) -> User {
        let id = Uuid::new_v4();
        let user = User {
            id,
            name: format!("User {id}"),
            email: format!("{id}@example.edu"),
            role,
            created_at: Utc::now(),
        };
        self.state.lock().await.users.insert(user.id, user.clone());
        user
    }

    /// Seeds a module, a faculty instructor and a room, plus one session
    /// referencing all three.
    pub async fn seed_scheduled(&self, day: DayOfWeek, start: &str, end: &str) -> Session {
        let module = self.seed_module().await;
        let instructor = self.seed_user(Role::Faculty).await;
        let room = self.seed_room(&format!("R-{}", Uuid::new_v4().simple())).await;
        let session = Session {
            module_id: module.id,
            instructor_id: instructor.id,
            room_id: room.id,
            ..sample_session(day, start, end)
        };
        self.seed_sessions([session.clone()]).await;
        session
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn session_ids(&self) -> Vec<Uuid> {
        self.state.lock().await.sessions.iter().map(|session| session.id).collect()
    }

    pub async fn all_sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.clone()
    }
}

#[async_trait::async_trait]
impl EntityStore for InMemoryStore {
    async fn get_module(&self, id: &Uuid) -> Result<Option<Module>, AppError> {
        Ok(self.state.lock().await.modules.get(id).cloned())
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn get_room(&self, id: &Uuid) -> Result<Option<Room>, AppError> {
        Ok(self.state.lock().await.rooms.get(id).cloned())
    }

    async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.state.lock().await.sessions.iter().find(|session| session.id == *id).cloned())
    }

    async fn find_sessions_by_resource_and_day(&self, kind: ResourceKind, resource_id: &Uuid, day: DayOfWeek) -> Result<Vec<Session>, AppError> {
        let partition: Vec<Session> = {
            let state = self.state.lock().await;
            state
                .sessions
                .iter()
                .filter(|session| session.day == day && session.resource_id(kind) == *resource_id)
                .cloned()
                .collect()
        };
        // Give concurrent writers a chance to interleave between read and write.
        tokio::task::yield_now().await;
        Ok(partition)
    }

    async fn insert_session(&self, draft: &SessionDraft) -> Result<Session, AppError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            module_id: draft.module_id,
            instructor_id: draft.instructor_id,
            room_id: draft.room_id,
            day: draft.day,
            start_time: draft.start_time,
            end_time: draft.end_time,
            session_type: draft.session_type,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn patch_session(&self, id: &Uuid, patch: &SessionPatch) -> Result<Option<Session>, AppError> {
        let mut state = self.state.lock().await;
        let Some(session) = state.sessions.iter_mut().find(|session| session.id == *id) else {
            return Ok(None);
        };
        let draft = SessionDraft::overlay(session, patch);
        session.module_id = draft.module_id;
        session.instructor_id = draft.instructor_id;
        session.room_id = draft.room_id;
        session.day = draft.day;
        session.start_time = draft.start_time;
        session.end_time = draft.end_time;
        session.session_type = draft.session_type;
        session.updated_at = Utc::now();
        Ok(Some(session.clone()))
    }

    async fn delete_session(&self, id: &Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|session| session.id != *id);
        Ok(state.sessions.len() < before)
    }
}

#[async_trait::async_trait]
impl TimetableRepository for InMemoryStore {
    async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self
            .state
            .lock()
            .await
            .sessions
            .iter()
            .filter(|session| filter.matches(session))
            .cloned()
            .collect();
        sessions.sort_by_key(|session| (session.day, session.start_time));
        Ok(sessions)
    }

    async fn list_session_details(&self, filter: &SessionFilter) -> Result<Vec<SessionDetails>, AppError> {
        let sessions = self.list_sessions(filter).await?;
        let state = self.state.lock().await;
        Ok(sessions.iter().filter_map(|session| state.details(session)).collect())
    }

    async fn get_session_details(&self, id: &Uuid) -> Result<Option<SessionDetails>, AppError> {
        let state = self.state.lock().await;
        Ok(state.sessions.iter().find(|session| session.id == *id).and_then(|session| state.details(session)))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        let mut rooms: Vec<Room> = self.state.lock().await.rooms.values().cloned().collect();
        // Same order as the SQL listing: building with NULLs last, then name.
        rooms.sort_by(|a, b| (a.building.is_none(), &a.building, &a.name).cmp(&(b.building.is_none(), &b.building, &b.name)));
        Ok(rooms)
    }
}
