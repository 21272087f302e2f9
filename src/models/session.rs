use crate::models::room::RoomType;
use crate::models::schedule::{DayOfWeek, ResourceKind, SessionType, TIME_OF_DAY_PATTERN, TimeOfDay};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// One scheduled occupation of a room by an instructor teaching a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub module_id: Uuid,
    pub instructor_id: Uuid,
    pub room_id: Uuid,
    pub day: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub session_type: SessionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn resource_id(&self, kind: ResourceKind) -> Uuid {
        match kind {
            ResourceKind::Room => self.room_id,
            ResourceKind::Instructor => self.instructor_id,
        }
    }

    pub fn draft(&self) -> SessionDraft {
        SessionDraft {
            module_id: self.module_id,
            instructor_id: self.instructor_id,
            room_id: self.room_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            session_type: self.session_type,
        }
    }
}

/// Raw payload for creating or editing a session.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation failure rather than a deserialization error.
/// Enum-like fields are kept as strings and normalised once by the
/// validation chain.
///
/// The `schemars` pattern mirrors `TIME_OF_DAY_REGEX`; schemars cannot read
/// the validator's static regex path.
#[derive(Deserialize, Debug, Clone, Default, Validate, JsonSchema)]
pub struct SessionRequest {
    pub module_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day: Option<String>,
    #[validate(regex(path = *TIME_OF_DAY_PATTERN, code = "time_format", message = "Invalid start time format. Use HH:MM:SS"))]
    #[schemars(regex(pattern = r"^([0-1][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$"))]
    pub start_time: Option<String>,
    #[validate(regex(path = *TIME_OF_DAY_PATTERN, code = "time_format", message = "Invalid end time format. Use HH:MM:SS"))]
    #[schemars(regex(pattern = r"^([0-1][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$"))]
    pub end_time: Option<String>,
    pub session_type: Option<String>,
}

/// A complete, shape-validated candidate session (not yet checked for
/// references or conflicts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDraft {
    pub module_id: Uuid,
    pub instructor_id: Uuid,
    pub room_id: Uuid,
    pub day: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub session_type: SessionType,
}

impl SessionDraft {
    pub fn resource_id(&self, kind: ResourceKind) -> Uuid {
        match kind {
            ResourceKind::Room => self.room_id,
            ResourceKind::Instructor => self.instructor_id,
        }
    }

    /// The stored record overlaid by the provided patch fields.
    pub fn overlay(existing: &Session, patch: &SessionPatch) -> Self {
        Self {
            module_id: patch.module_id.unwrap_or(existing.module_id),
            instructor_id: patch.instructor_id.unwrap_or(existing.instructor_id),
            room_id: patch.room_id.unwrap_or(existing.room_id),
            day: patch.day.unwrap_or(existing.day),
            start_time: patch.start_time.unwrap_or(existing.start_time),
            end_time: patch.end_time.unwrap_or(existing.end_time),
            session_type: patch.session_type.unwrap_or(existing.session_type),
        }
    }
}

/// Normalised field-level changes for an existing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub module_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub day: Option<DayOfWeek>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub session_type: Option<SessionType>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }
}

/// Filters for the weekly timetable listing. All present filters must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub day: Option<DayOfWeek>,
    pub instructor_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
}

impl SessionFilter {
    pub fn matches(&self, session: &Session) -> bool {
        self.day.is_none_or(|day| session.day == day)
            && self.instructor_id.is_none_or(|id| session.instructor_id == id)
            && self.module_id.is_none_or(|id| session.module_id == id)
            && self.room_id.is_none_or(|id| session.room_id == id)
    }
}

/// A session joined with the display fields of the module, instructor and
/// room it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub session: Session,
    pub module_code: String,
    pub module_name: String,
    pub instructor_name: String,
    pub instructor_email: String,
    pub room_name: String,
    pub room_type: RoomType,
    pub building: Option<String>,
}

/// Sessions colliding with a candidate, per resource axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub room_conflicts: Vec<Session>,
    pub instructor_conflicts: Vec<Session>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.room_conflicts.is_empty() && self.instructor_conflicts.is_empty()
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub instructor_id: Uuid,
    pub room_id: Uuid,
    pub day: DayOfWeek,
    /// `HH:MM:SS`
    pub start_time: String,
    /// `HH:MM:SS`
    pub end_time: String,
    pub session_type: SessionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            module_id: session.module_id,
            instructor_id: session.instructor_id,
            room_id: session.room_id,
            day: session.day,
            start_time: session.start_time.to_string(),
            end_time: session.end_time.to_string(),
            session_type: session.session_type,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct SessionDetailsResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub module_code: String,
    pub module_name: String,
    pub instructor_name: String,
    pub instructor_email: String,
    pub room_name: String,
    pub room_type: RoomType,
    pub building: Option<String>,
}

impl From<&SessionDetails> for SessionDetailsResponse {
    fn from(details: &SessionDetails) -> Self {
        Self {
            session: SessionResponse::from(&details.session),
            module_code: details.module_code.clone(),
            module_name: details.module_name.clone(),
            instructor_name: details.instructor_name.clone(),
            instructor_email: details.instructor_email.clone(),
            room_name: details.room_name.clone(),
            room_type: details.room_type,
            building: details.building.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct ConflictReportResponse {
    pub has_conflicts: bool,
    pub room_conflicts: Vec<SessionResponse>,
    pub instructor_conflicts: Vec<SessionResponse>,
}

impl From<&ConflictReport> for ConflictReportResponse {
    fn from(report: &ConflictReport) -> Self {
        Self {
            has_conflicts: !report.is_clear(),
            room_conflicts: report.room_conflicts.iter().map(SessionResponse::from).collect(),
            instructor_conflicts: report.instructor_conflicts.iter().map(SessionResponse::from).collect(),
        }
    }
}
