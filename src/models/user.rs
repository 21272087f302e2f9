use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Faculty,
    #[default]
    Student,
}

impl Role {
    /// Only faculty members and admins may be scheduled to teach a session.
    pub fn can_instruct(&self) -> bool {
        matches!(self, Role::Faculty | Role::Admin)
    }
}

#[derive(Serialize, Debug, Clone, Default, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
