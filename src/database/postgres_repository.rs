use crate::models::schedule::ResourceKind;
use sqlx::PgPool;

pub const ROOM_OVERLAP_CONSTRAINT: &str = "timetable_sessions_room_no_overlap";
pub const INSTRUCTOR_OVERLAP_CONSTRAINT: &str = "timetable_sessions_instructor_no_overlap";

#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}

/// Which double-booking constraint rejected the statement, if any
/// (SQLSTATE 23P01, exclusion_violation).
pub(crate) fn exclusion_violation(err: &sqlx::Error) -> Option<ResourceKind> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() != Some("23P01") {
        return None;
    }
    match db_err.constraint() {
        Some(ROOM_OVERLAP_CONSTRAINT) => Some(ResourceKind::Room),
        Some(INSTRUCTOR_OVERLAP_CONSTRAINT) => Some(ResourceKind::Instructor),
        _ => None,
    }
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().and_then(|e| e.code()).as_deref() == Some("23503")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/20261016000000_create_timetable.sql");

    #[test]
    fn test_overlap_constraint_names_match_the_schema() {
        for name in [ROOM_OVERLAP_CONSTRAINT, INSTRUCTOR_OVERLAP_CONSTRAINT] {
            let declaration = format!("CONSTRAINT {name}\n        EXCLUDE USING gist");
            assert!(SCHEMA.contains(&declaration), "missing exclusion constraint {name}");
        }
    }

    #[test]
    fn test_non_database_errors_are_not_constraint_violations() {
        assert!(exclusion_violation(&sqlx::Error::RowNotFound).is_none());
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolClosed));
    }
}
