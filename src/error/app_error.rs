use crate::models::schedule::ResourceKind;
use crate::models::session::{Session, SessionResponse};
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::serde::Serialize;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Invalid identifier: {message}")]
    UuidError {
        message: String,
        #[source]
        source: uuid::Error,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("Room conflict: Room is already occupied at this time")]
    RoomConflict(Vec<Session>),
    #[error("Instructor conflict: Instructor is already scheduled at this time")]
    InstructorConflict(Vec<Session>),
    #[error("Instructor must be a faculty member or admin")]
    IneligibleInstructor(Uuid),
    #[error("Internal server error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn uuid(message: impl Into<String>, source: uuid::Error) -> Self {
        Self::UuidError {
            message: message.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(kind: ResourceKind, sessions: Vec<Session>) -> Self {
        match kind {
            ResourceKind::Room => Self::RoomConflict(sessions),
            ResourceKind::Instructor => Self::InstructorConflict(sessions),
        }
    }

    /// Sessions carried by a conflict error; empty for every other kind.
    pub fn conflicting_sessions(&self) -> &[Session] {
        match self {
            AppError::RoomConflict(sessions) | AppError::InstructorConflict(sessions) => sessions.as_slice(),
            _ => &[],
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(e: uuid::Error) -> Self {
        AppError::uuid("Invalid UUID", e)
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Db { .. } => Status::InternalServerError,
            AppError::Validation(_) => Status::BadRequest,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::UuidError { .. } => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::RoomConflict(_) => Status::Conflict,
            AppError::InstructorConflict(_) => Status::Conflict,
            AppError::IneligibleInstructor(_) => Status::UnprocessableEntity,
            AppError::ConfigurationError { .. } => Status::InternalServerError,
            AppError::InvalidConfiguration(_) => Status::InternalServerError,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<Vec<SessionResponse>>,
}

impl From<&AppError> for ErrorBody {
    fn from(e: &AppError) -> Self {
        let conflicts = match e {
            AppError::RoomConflict(sessions) | AppError::InstructorConflict(sessions) => {
                Some(sessions.iter().map(SessionResponse::from).collect())
            }
            _ => None,
        };
        Self {
            message: e.to_string(),
            conflicts,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = crate::middleware::request_id_of(req).unwrap_or_else(|| "unknown".to_string());

        let status = Status::from(&self);
        if status.class().is_server_error() {
            error!(
                error = ?self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request failed"
            );
        } else {
            warn!(
                error = %self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request rejected"
            );
        }

        let body = serde_json::to_string(&ErrorBody::from(&self)).unwrap_or_else(|_| format!("{{\"message\":\"{}\"}}", status.reason_lossy()));

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("404", "Not Found"),
            ("409", "Scheduling Conflict"),
            ("422", "Ineligible Instructor"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::db("Database error", e),
        }
    }
}
