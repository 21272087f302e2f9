use crate::database::entity_store::{EntityStore, TimetableRepository};
use crate::database::postgres_repository::{PostgresRepository, exclusion_violation, is_foreign_key_violation};
use crate::error::app_error::AppError;
use crate::models::module::Module;
use crate::models::room::{Room, RoomType};
use crate::models::schedule::{DayOfWeek, ResourceKind, SessionType};
use crate::models::session::{Session, SessionDetails, SessionDraft, SessionFilter, SessionPatch};
use crate::models::user::User;
use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, module_id, instructor_id, room_id, day, start_time, end_time, session_type, created_at, updated_at";

const WEEK_ORDER: &str = "array_position(ARRAY['MONDAY','TUESDAY','WEDNESDAY','THURSDAY','FRIDAY','SATURDAY','SUNDAY'], t.day)";

const FILTER_CLAUSE: &str = "($1::text IS NULL OR t.day = $1)
              AND ($2::uuid IS NULL OR t.instructor_id = $2)
              AND ($3::uuid IS NULL OR t.module_id = $3)
              AND ($4::uuid IS NULL OR t.room_id = $4)";

const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.module_id, t.instructor_id, t.room_id, t.day, t.start_time, t.end_time, t.session_type,
           t.created_at, t.updated_at,
           m.code AS module_code, m.name AS module_name,
           u.name AS instructor_name, u.email AS instructor_email,
           r.name AS room_name, r.room_type, r.building
    FROM timetable_sessions t
    JOIN modules m ON t.module_id = m.id
    JOIN users u ON t.instructor_id = u.id
    JOIN rooms r ON t.room_id = r.id
"#;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    module_id: Uuid,
    instructor_id: Uuid,
    room_id: Uuid,
    day: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    session_type: SessionType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            module_id: row.module_id,
            instructor_id: row.instructor_id,
            room_id: row.room_id,
            day: row.day,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            session_type: row.session_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionDetailsRow {
    #[sqlx(flatten)]
    session: SessionRow,
    module_code: String,
    module_name: String,
    instructor_name: String,
    instructor_email: String,
    room_name: String,
    room_type: RoomType,
    building: Option<String>,
}

impl From<SessionDetailsRow> for SessionDetails {
    fn from(row: SessionDetailsRow) -> Self {
        SessionDetails {
            session: row.session.into(),
            module_code: row.module_code,
            module_name: row.module_name,
            instructor_name: row.instructor_name,
            instructor_email: row.instructor_email,
            room_name: row.room_name,
            room_type: row.room_type,
            building: row.building,
        }
    }
}

/// Translates constraint failures on session writes into domain errors.
fn map_session_write_error(err: sqlx::Error) -> AppError {
    if let Some(kind) = exclusion_violation(&err) {
        // Another writer committed an overlapping session between our check and our write.
        return AppError::conflict(kind, Vec::new());
    }
    if is_foreign_key_violation(&err) {
        return AppError::not_found("Referenced module, room or instructor does not exist");
    }
    AppError::db("Failed to write timetable session", err)
}

#[async_trait::async_trait]
impl EntityStore for PostgresRepository {
    async fn get_module(&self, id: &Uuid) -> Result<Option<Module>, AppError> {
        self.get_module_by_id(id).await
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        self.get_user_by_id(id).await
    }

    async fn get_room(&self, id: &Uuid) -> Result<Option<Room>, AppError> {
        self.get_room_by_id(id).await
    }

    async fn get_session(&self, id: &Uuid) -> Result<Option<Session>, AppError> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM timetable_sessions WHERE id = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(Session::from))
    }

    async fn find_sessions_by_resource_and_day(&self, kind: ResourceKind, resource_id: &Uuid, day: DayOfWeek) -> Result<Vec<Session>, AppError> {
        // Safe from SQL injection: the column name comes from a closed enum
        let query = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM timetable_sessions
            WHERE {} = $1 AND day = $2
            ORDER BY start_time ASC
            "#,
            kind.column()
        );

        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(resource_id)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn insert_session(&self, draft: &SessionDraft) -> Result<Session, AppError> {
        let query = format!(
            r#"
            INSERT INTO timetable_sessions (module_id, instructor_id, room_id, day, start_time, end_time, session_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(draft.module_id)
            .bind(draft.instructor_id)
            .bind(draft.room_id)
            .bind(draft.day)
            .bind(NaiveTime::from(draft.start_time))
            .bind(NaiveTime::from(draft.end_time))
            .bind(draft.session_type)
            .fetch_one(&self.pool)
            .await
            .map_err(map_session_write_error)?;

        Ok(row.into())
    }

    async fn patch_session(&self, id: &Uuid, patch: &SessionPatch) -> Result<Option<Session>, AppError> {
        let query = format!(
            r#"
            UPDATE timetable_sessions
            SET module_id = COALESCE($2, module_id),
                instructor_id = COALESCE($3, instructor_id),
                room_id = COALESCE($4, room_id),
                day = COALESCE($5, day),
                start_time = COALESCE($6, start_time),
                end_time = COALESCE($7, end_time),
                session_type = COALESCE($8, session_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(patch.module_id)
            .bind(patch.instructor_id)
            .bind(patch.room_id)
            .bind(patch.day)
            .bind(patch.start_time.map(NaiveTime::from))
            .bind(patch.end_time.map(NaiveTime::from))
            .bind(patch.session_type)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_session_write_error)?;

        Ok(row.map(Session::from))
    }

    async fn delete_session(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM timetable_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl TimetableRepository for PostgresRepository {
    async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, AppError> {
        let query = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM timetable_sessions t
            WHERE {FILTER_CLAUSE}
            ORDER BY {WEEK_ORDER}, t.start_time ASC
            "#
        );

        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(filter.day)
            .bind(filter.instructor_id)
            .bind(filter.module_id)
            .bind(filter.room_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    async fn list_session_details(&self, filter: &SessionFilter) -> Result<Vec<SessionDetails>, AppError> {
        let query = format!("{DETAIL_SELECT} WHERE {FILTER_CLAUSE} ORDER BY {WEEK_ORDER}, t.start_time ASC");

        let rows = sqlx::query_as::<_, SessionDetailsRow>(&query)
            .bind(filter.day)
            .bind(filter.instructor_id)
            .bind(filter.module_id)
            .bind(filter.room_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SessionDetails::from).collect())
    }

    async fn get_session_details(&self, id: &Uuid) -> Result<Option<SessionDetails>, AppError> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, SessionDetailsRow>(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(SessionDetails::from))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        self.list_all_rooms().await
    }
}
