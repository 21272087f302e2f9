use crate::error::app_error::AppError;
use crate::models::schedule::{DayOfWeek, SessionType, TimeOfDay};
use crate::models::session::{SessionDraft, SessionPatch, SessionRequest};
use crate::service::interval::TimeRange;
use validator::Validate;

/// A single shape check over the raw payload.
type Check = fn(&SessionRequest) -> Result<(), AppError>;

/// Run in order; the first failure is returned.
const NEW_SESSION_CHECKS: &[Check] = &[require_all_fields, check_day, check_time_format, check_session_type];

const PATCH_CHECKS: &[Check] = &[check_day, check_time_format, check_session_type];

fn require_all_fields(request: &SessionRequest) -> Result<(), AppError> {
    let complete = request.module_id.is_some()
        && request.instructor_id.is_some()
        && request.room_id.is_some()
        && request.day.is_some()
        && request.start_time.is_some()
        && request.end_time.is_some();
    if !complete {
        return Err(AppError::validation(
            "Missing required fields: module_id, instructor_id, room_id, day, start_time, end_time",
        ));
    }
    Ok(())
}

fn check_day(request: &SessionRequest) -> Result<(), AppError> {
    match request.day.as_deref() {
        Some(day) => parse_day(day).map(|_| ()),
        None => Ok(()),
    }
}

fn check_time_format(request: &SessionRequest) -> Result<(), AppError> {
    request.validate()?;
    Ok(())
}

fn check_session_type(request: &SessionRequest) -> Result<(), AppError> {
    match request.session_type.as_deref() {
        Some(session_type) => parse_session_type(session_type).map(|_| ()),
        None => Ok(()),
    }
}

pub fn parse_day(raw: &str) -> Result<DayOfWeek, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation("Invalid day. Must be one of: MONDAY, TUESDAY, WEDNESDAY, THURSDAY, FRIDAY, SATURDAY, SUNDAY"))
}

pub fn parse_time(raw: &str) -> Result<TimeOfDay, AppError> {
    raw.parse().map_err(|_| AppError::validation("Invalid time format. Use HH:MM:SS"))
}

fn parse_session_type(raw: &str) -> Result<SessionType, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation("Invalid session type. Must be one of: LECTURE, LAB, TUTORIAL, SEMINAR, EXAM"))
}

fn run_checks(checks: &[Check], request: &SessionRequest) -> Result<(), AppError> {
    checks.iter().try_for_each(|check| check(request))
}

/// Turns the raw strings into closed types. Only called after the checks
/// above have passed.
fn normalize(request: &SessionRequest) -> Result<SessionPatch, AppError> {
    Ok(SessionPatch {
        module_id: request.module_id,
        instructor_id: request.instructor_id,
        room_id: request.room_id,
        day: request.day.as_deref().map(parse_day).transpose()?,
        start_time: request.start_time.as_deref().map(parse_time).transpose()?,
        end_time: request.end_time.as_deref().map(parse_time).transpose()?,
        session_type: request.session_type.as_deref().map(parse_session_type).transpose()?,
    })
}

/// Rejects drafts whose interval is empty or inverted.
pub fn check_interval(draft: &SessionDraft) -> Result<(), AppError> {
    TimeRange::of_draft(draft).map(|_| ())
}

/// Shape validation for a creation payload. Referential and conflict checks
/// happen later, in admission.
pub fn validate_new_session(request: &SessionRequest) -> Result<SessionDraft, AppError> {
    run_checks(NEW_SESSION_CHECKS, request)?;
    let patch = normalize(request)?;

    let (Some(module_id), Some(instructor_id), Some(room_id), Some(day), Some(start_time), Some(end_time)) =
        (patch.module_id, patch.instructor_id, patch.room_id, patch.day, patch.start_time, patch.end_time)
    else {
        return Err(AppError::validation("Missing required fields"));
    };

    let draft = SessionDraft {
        module_id,
        instructor_id,
        room_id,
        day,
        start_time,
        end_time,
        session_type: patch.session_type.unwrap_or_default(),
    };
    check_interval(&draft)?;
    Ok(draft)
}

/// Shape validation for an update payload. The interval is checked once the
/// patch has been overlaid on the stored session.
pub fn validate_session_patch(request: &SessionRequest) -> Result<SessionPatch, AppError> {
    let patch = validate_preview_patch(request)?;
    if patch.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }
    Ok(patch)
}

/// Like [`validate_session_patch`] but an empty payload is allowed; it
/// previews the stored session unchanged.
pub fn validate_preview_patch(request: &SessionRequest) -> Result<SessionPatch, AppError> {
    run_checks(PATCH_CHECKS, request)?;
    normalize(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn full_request() -> SessionRequest {
        SessionRequest {
            module_id: Some(Uuid::new_v4()),
            instructor_id: Some(Uuid::new_v4()),
            room_id: Some(Uuid::new_v4()),
            day: Some("monday".to_string()),
            start_time: Some("09:00:00".to_string()),
            end_time: Some("10:00:00".to_string()),
            session_type: None,
        }
    }

    #[test]
    fn test_valid_request_is_normalised() {
        let request = SessionRequest {
            session_type: Some("lab".to_string()),
            ..full_request()
        };
        let draft = validate_new_session(&request).unwrap();

        assert_eq!(draft.day, DayOfWeek::Monday);
        assert_eq!(draft.session_type, SessionType::Lab);
        assert_eq!(draft.start_time.to_string(), "09:00:00");
        assert_eq!(draft.module_id, request.module_id.unwrap());
    }

    #[test]
    fn test_session_type_defaults_to_lecture() {
        let draft = validate_new_session(&full_request()).unwrap();
        assert_eq!(draft.session_type, SessionType::Lecture);
    }

    #[test]
    fn test_missing_field_is_reported_first() {
        let request = SessionRequest {
            room_id: None,
            day: Some("Funday".to_string()),
            ..full_request()
        };
        match validate_new_session(&request) {
            Err(AppError::Validation(message)) => assert!(message.starts_with("Missing required fields")),
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_day_rejected_before_time_format() {
        let request = SessionRequest {
            day: Some("Funday".to_string()),
            start_time: Some("9am".to_string()),
            ..full_request()
        };
        match validate_new_session(&request) {
            Err(AppError::Validation(message)) => assert!(message.starts_with("Invalid day")),
            other => panic!("expected invalid day error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_time_rejected() {
        let request = SessionRequest {
            end_time: Some("10:00".to_string()),
            ..full_request()
        };
        assert!(matches!(validate_new_session(&request), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_start_must_precede_end() {
        let equal = SessionRequest {
            end_time: Some("09:00:00".to_string()),
            ..full_request()
        };
        let inverted = SessionRequest {
            start_time: Some("11:00:00".to_string()),
            ..full_request()
        };
        assert!(matches!(validate_new_session(&equal), Err(AppError::Validation(_))));
        assert!(matches!(validate_new_session(&inverted), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unknown_session_type_rejected() {
        let request = SessionRequest {
            session_type: Some("WORKSHOP".to_string()),
            ..full_request()
        };
        match validate_new_session(&request) {
            Err(AppError::Validation(message)) => assert!(message.starts_with("Invalid session type")),
            other => panic!("expected invalid session type error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_patch_rejected() {
        match validate_session_patch(&SessionRequest::default()) {
            Err(AppError::Validation(message)) => assert_eq!(message, "No fields to update"),
            other => panic!("expected empty patch error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_patch_keeps_absent_fields_empty() {
        let request = SessionRequest {
            day: Some("Tuesday".to_string()),
            ..SessionRequest::default()
        };
        let patch = validate_session_patch(&request).unwrap();

        assert_eq!(patch.day, Some(DayOfWeek::Tuesday));
        assert!(patch.room_id.is_none());
        assert!(patch.start_time.is_none());
        assert!(patch.session_type.is_none());
    }
}
