use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::session::{ConflictReportResponse, SessionDetailsResponse, SessionFilter, SessionRequest, SessionResponse};
use crate::service::admission::SessionAdmissionService;
use crate::service::locks::PartitionLocks;
use crate::service::timetable::TimetableService;
use crate::service::validation::parse_day;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use uuid::Uuid;

#[allow(clippy::result_large_err)]
fn parse_optional_uuid(value: Option<String>, what: &str) -> Result<Option<Uuid>, AppError> {
    value
        .map(|raw| Uuid::parse_str(&raw).map_err(|e| AppError::uuid(format!("Invalid {what} id"), e)))
        .transpose()
}

#[allow(clippy::result_large_err)]
fn parse_filter(day: Option<String>, instructor_id: Option<String>, module_id: Option<String>, room_id: Option<String>) -> Result<SessionFilter, AppError> {
    Ok(SessionFilter {
        day: day.as_deref().map(parse_day).transpose()?,
        instructor_id: parse_optional_uuid(instructor_id, "instructor")?,
        module_id: parse_optional_uuid(module_id, "module")?,
        room_id: parse_optional_uuid(room_id, "room")?,
    })
}

/// Admit a new session into the timetable.
/// Returns 409 with the colliding sessions if the room or instructor is already booked.
#[openapi(tag = "Timetable")]
#[post("/", data = "<payload>")]
pub async fn create_session(
    pool: &State<PgPool>,
    locks: &State<PartitionLocks>,
    payload: JsonBody<SessionRequest>,
) -> Result<(Status, Json<SessionResponse>), AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let session = SessionAdmissionService::new(&repo, locks.inner()).admit_new_session(&payload).await?;
    Ok((Status::Created, Json(SessionResponse::from(&session))))
}

/// Weekly timetable, optionally filtered by day, instructor, module or room.
/// Each entry carries the module code and name, instructor name and email,
/// and room name, type and building.
#[openapi(tag = "Timetable")]
#[get("/?<day>&<instructor_id>&<module_id>&<room_id>")]
pub async fn list_sessions(
    pool: &State<PgPool>,
    day: Option<String>,
    instructor_id: Option<String>,
    module_id: Option<String>,
    room_id: Option<String>,
) -> Result<Json<Vec<SessionDetailsResponse>>, AppError> {
    let filter = parse_filter(day, instructor_id, module_id, room_id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let sessions = TimetableService::new(&repo).weekly_timetable(&filter).await?;
    Ok(Json(sessions.iter().map(SessionDetailsResponse::from).collect()))
}

/// Preview the sessions a candidate would collide with, without writing anything.
/// With `exclude_id` the payload is a partial edit of that session.
#[openapi(tag = "Timetable")]
#[post("/conflicts?<exclude_id>", data = "<payload>")]
pub async fn preview_conflicts(
    pool: &State<PgPool>,
    locks: &State<PartitionLocks>,
    exclude_id: Option<String>,
    payload: JsonBody<SessionRequest>,
) -> Result<Json<ConflictReportResponse>, AppError> {
    let exclude_id = parse_optional_uuid(exclude_id, "session")?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let report = SessionAdmissionService::new(&repo, locks.inner())
        .list_conflicts(&payload, exclude_id.as_ref())
        .await?;
    Ok(Json(ConflictReportResponse::from(&report)))
}

#[openapi(tag = "Timetable")]
#[get("/instructor/<id>")]
pub async fn list_sessions_by_instructor(pool: &State<PgPool>, id: String) -> Result<Json<Vec<SessionDetailsResponse>>, AppError> {
    let instructor_id = Uuid::parse_str(&id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let sessions = TimetableService::new(&repo).timetable_by_instructor(&instructor_id).await?;
    Ok(Json(sessions.iter().map(SessionDetailsResponse::from).collect()))
}

#[openapi(tag = "Timetable")]
#[get("/module/<id>")]
pub async fn list_sessions_by_module(pool: &State<PgPool>, id: String) -> Result<Json<Vec<SessionDetailsResponse>>, AppError> {
    let module_id = Uuid::parse_str(&id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let sessions = TimetableService::new(&repo).timetable_by_module(&module_id).await?;
    Ok(Json(sessions.iter().map(SessionDetailsResponse::from).collect()))
}

#[openapi(tag = "Timetable")]
#[get("/<id>")]
pub async fn get_session(pool: &State<PgPool>, id: String) -> Result<Json<SessionDetailsResponse>, AppError> {
    let session_id = Uuid::parse_str(&id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let session = TimetableService::new(&repo).get_session(&session_id).await?;
    Ok(Json(SessionDetailsResponse::from(&session)))
}

/// Edit a session. Absent fields keep their stored values; the merged
/// session is validated as a whole.
#[openapi(tag = "Timetable")]
#[put("/<id>", data = "<payload>")]
pub async fn update_session(
    pool: &State<PgPool>,
    locks: &State<PartitionLocks>,
    id: String,
    payload: JsonBody<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session_id = Uuid::parse_str(&id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let session = SessionAdmissionService::new(&repo, locks.inner())
        .admit_session_update(&session_id, &payload)
        .await?;
    Ok(Json(SessionResponse::from(&session)))
}

#[openapi(tag = "Timetable")]
#[delete("/<id>")]
pub async fn delete_session(pool: &State<PgPool>, locks: &State<PartitionLocks>, id: String) -> Result<Status, AppError> {
    let session_id = Uuid::parse_str(&id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    if SessionAdmissionService::new(&repo, locks.inner()).remove_session(&session_id).await? {
        Ok(Status::NoContent)
    } else {
        Err(AppError::not_found("Timetable entry not found"))
    }
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        create_session,
        list_sessions,
        preview_conflicts,
        list_sessions_by_instructor,
        list_sessions_by_module,
        get_session,
        update_session,
        delete_session
    ]
}
